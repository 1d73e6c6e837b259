//! End-to-end scenarios over the public cell API.
use phosphor::{ClearCell, Error, ReadCell, WriteCell};
use std::{cell::Cell, rc::Rc};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn recompute_transparency() {
    init_logging();

    let n = WriteCell::value(0i32);
    let evals = Rc::new(Cell::new(0u32));
    let n2 = n.clone();
    let evals2 = evals.clone();
    let t = ReadCell::new(move || {
        evals2.set(evals2.get() + 1);
        let n = n2.get()?;
        Ok((n + 2) + 3 + (n + 2) * 2)
    });

    assert_eq!(t.get().unwrap(), 9);
    assert_eq!(t.get().unwrap(), 9);

    n.set(1).unwrap();
    assert!(!t.is_cached().unwrap());
    assert_eq!(t.get().unwrap(), 12);

    // exactly one evaluation per cached period
    assert_eq!(evals.get(), 2);
}

#[test]
fn callers_keep_first_wired_order() {
    struct Viewer {
        u: ReadCell<i32>,
    }

    impl Viewer {
        fn new(t: &ReadCell<i32>, modulus: i32) -> Viewer {
            let t = t.clone();
            Viewer {
                u: ReadCell::new(move || Ok(t.get()? % modulus)),
            }
        }
    }

    let n = WriteCell::value(0i32);
    let n2 = n.clone();
    let t = ReadCell::new(move || {
        let n = n2.get()?;
        Ok(n + 2 + 3 + (n + 2) * 2)
    });

    let v1 = Viewer::new(&t, 7);
    let v2 = Viewer::new(&t, 12);
    assert_eq!(v1.u.get().unwrap(), 2);
    assert_eq!(v2.u.get().unwrap(), 9);

    assert_eq!(t.callers().unwrap(), Some(vec![v1.u.ptr(), v2.u.ptr()]));
}

#[test]
fn dynamic_topology() {
    let x = ClearCell::value(0i32);
    let y = WriteCell::value(11i32);
    let flag = WriteCell::value(true);

    let x2 = x.clone();
    let y2 = y.clone();
    let flag2 = flag.clone();
    let t = ReadCell::new(move || {
        let a = x2.get()? * 2;
        Ok(if flag2.get()? { a + y2.get()? } else { a + 1 })
    });

    assert_eq!(t.get().unwrap(), 11);
    assert_eq!(
        t.callees().unwrap(),
        Some(vec![x.ptr(), flag.ptr(), y.ptr()])
    );

    flag.set(false).unwrap();
    assert!(!t.is_cached().unwrap());
    assert_eq!(t.get().unwrap(), 1);

    // the branch not taken is no longer a dependency
    assert_eq!(t.callees().unwrap(), Some(vec![x.ptr(), flag.ptr()]));
    assert_eq!(y.callers().unwrap(), Some(vec![]));
}

#[test]
fn dropped_callers_vanish() {
    let x = WriteCell::value(1i32);
    let x2 = x.clone();
    let reader = ReadCell::new(move || Ok(x2.get()? + 1));

    assert_eq!(reader.get().unwrap(), 2);
    assert_eq!(x.callers().unwrap().map(|c| c.len()), Some(1));

    drop(reader);
    assert_eq!(x.callers().unwrap().map(|c| c.len()), Some(0));
}

#[test]
fn mutation_during_evaluation_is_rejected() {
    let x = WriteCell::value(1i32);
    let y = WriteCell::value(true);
    let x2 = x.clone();
    let y2 = y.clone();
    let z = ReadCell::new(move || {
        y2.set(false)?;
        Ok(x2.get()? + 1)
    });

    assert!(matches!(z.get(), Err(Error::ForbiddenDuringEvaluation)));
    assert!(!z.is_cached().unwrap());

    // the failed evaluation left y untouched and the stack unwound
    assert!(y.get().unwrap());
    y.set(false).unwrap();
    assert!(!y.get().unwrap());
}

#[test]
fn foreign_thread_access_is_rejected() {
    // cells are !Send; smuggle a handle across anyway to exercise the
    // runtime ownership check behind the type-level fence
    struct ForceSend<T>(T);
    unsafe impl<T> Send for ForceSend<T> {}

    let x = WriteCell::value(1i32);
    let smuggled = ForceSend(x.clone());

    let rejected = std::thread::spawn(move || {
        let cell = smuggled;
        matches!(cell.0.set(2), Err(Error::InvalidThread))
            && matches!(cell.0.get(), Err(Error::InvalidThread))
            && matches!(cell.0.is_cached(), Err(Error::InvalidThread))
            && matches!(cell.0.callers(), Err(Error::InvalidThread))
    })
    .join()
    .unwrap();

    assert!(rejected);
    // the owning thread is unaffected
    assert_eq!(x.get().unwrap(), 1);
}

#[test]
fn diamond_invalidation() {
    init_logging();

    let d = WriteCell::value(1i32);
    let d2 = d.clone();
    let b = ReadCell::new(move || Ok(d2.get()? + 1));
    let d3 = d.clone();
    let c = ReadCell::new(move || Ok(d3.get()? * 2));
    let b2 = b.clone();
    let c2 = c.clone();
    let a = ReadCell::new(move || Ok(b2.get()? + c2.get()?));

    assert_eq!(a.get().unwrap(), 4);
    assert_eq!(d.callers().unwrap(), Some(vec![b.ptr(), c.ptr()]));

    d.set(3).unwrap();
    assert!(!a.is_cached().unwrap());
    assert!(!b.is_cached().unwrap());
    assert!(!c.is_cached().unwrap());
    // no inbound edges survive the invalidation
    assert_eq!(d.callers().unwrap(), Some(vec![]));

    assert_eq!(a.get().unwrap(), 10);
}
