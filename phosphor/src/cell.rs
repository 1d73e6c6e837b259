//! Reactive cells: the caching state machine and its public handles.
use crate::{
    access::{Clearable, GraphNode, Readable, Writable},
    context::{Context, FrameGuard},
    error::Error,
    event::Event,
    nucleus::Nucleus,
};
use std::{
    any::Any,
    cell::{Cell, RefCell},
    fmt,
    hash::{Hash, Hasher},
    panic::{self, AssertUnwindSafe},
    rc::{Rc, Weak},
};
use tracing::warn;

//==================================================================================================

/// Type-erased interface to a cell, used to wire and tear down edges between
/// cells of different value types.
pub(crate) trait AnyCell {
    /// Appends `caller` to this cell's caller set and notifies the listener.
    fn add_caller(&self, caller: &CellPtr);
    /// Drops the edge from `caller`, notifying the listener. No-op if the
    /// entry is already gone.
    fn remove_caller(&self, caller: &CellPtr);
    /// Transitions this cell to uncached, invalidating its current callers
    /// first.
    fn invalidate(&self);
    fn is_cached(&self) -> bool;
}

/// Shared identity handle to a cell of any value type.
///
/// Two handles compare equal iff they designate the same cell. `CellPtr` is
/// what callee/caller lists and events are made of; it exposes no operations
/// besides identity.
#[derive(Clone)]
pub struct CellPtr(Rc<dyn AnyCell>);

impl CellPtr {
    pub(crate) fn new(cell: Rc<dyn AnyCell>) -> CellPtr {
        CellPtr(cell)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub(crate) fn downgrade(&self) -> WeakCellPtr {
        WeakCellPtr {
            cell: Rc::downgrade(&self.0),
            addr: self.addr(),
        }
    }

    pub(crate) fn add_caller(&self, caller: &CellPtr) {
        self.0.add_caller(caller);
    }

    pub(crate) fn remove_caller(&self, caller: &CellPtr) {
        self.0.remove_caller(caller);
    }

    pub(crate) fn invalidate(&self) {
        self.0.invalidate();
    }
}

impl PartialEq for CellPtr {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for CellPtr {}

impl Hash for CellPtr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.addr());
    }
}

impl fmt::Debug for CellPtr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("CellPtr")
            .field(&format_args!("{:#x}", self.addr()))
            .finish()
    }
}

/// Weak counterpart of [`CellPtr`], used for caller edges.
///
/// The address is captured at downgrade time so identity comparisons stay
/// possible after the cell is gone.
pub(crate) struct WeakCellPtr {
    cell: Weak<dyn AnyCell>,
    addr: usize,
}

impl WeakCellPtr {
    pub(crate) fn addr(&self) -> usize {
        self.addr
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.cell.strong_count() > 0
    }

    pub(crate) fn upgrade(&self) -> Option<CellPtr> {
        self.cell.upgrade().map(CellPtr)
    }
}

//==================================================================================================

type Expr<T> = dyn FnMut() -> Result<T, Error>;
type Listener<T> = dyn FnMut(&Event<T>);

/// An engine-backed cell: an expression, an optional listener, and the cache
/// slot. Shared by the public handle types.
pub(crate) struct CellInner<T> {
    ctx: Rc<Context>,
    weak_self: Weak<CellInner<T>>,
    expr: RefCell<Box<Expr<T>>>,
    listener: RefCell<Option<Box<Listener<T>>>>,
    /// Listener suppressed while a composite operation runs on this cell.
    muted: Cell<bool>,
    /// `Some` iff the cell is cached.
    slot: RefCell<Option<Nucleus<T>>>,
}

impl<T: 'static> CellInner<T> {
    fn new(expr: Box<Expr<T>>, listener: Option<Box<Listener<T>>>) -> Rc<CellInner<T>> {
        Rc::new_cyclic(|weak| CellInner {
            ctx: Context::current(),
            weak_self: weak.clone(),
            expr: RefCell::new(expr),
            listener: RefCell::new(listener),
            muted: Cell::new(false),
            slot: RefCell::new(None),
        })
    }

    /// Identity handle to this cell.
    fn ptr(&self) -> CellPtr {
        let this = self.weak_self.upgrade().expect("cell deallocated");
        CellPtr::new(this)
    }

    fn guard_thread(&self) -> Result<(), Error> {
        if Context::is_current(&self.ctx) {
            Ok(())
        } else {
            Err(Error::InvalidThread)
        }
    }

    fn guard_idle(&self) -> Result<(), Error> {
        if self.ctx.evaluating() {
            Err(Error::ForbiddenDuringEvaluation)
        } else {
            Ok(())
        }
    }

    /// Suppresses this cell's listener until the guard drops.
    fn mute(&self) -> MuteGuard<'_> {
        MuteGuard {
            flag: &self.muted,
            prev: self.muted.replace(true),
        }
    }

    /// Delivers `event` to the listener, unless muted. A panicking listener
    /// is caught and logged; graph state is never affected.
    fn emit(&self, event: Event<T>) {
        if self.muted.get() {
            return;
        }
        let mut listener = self.listener.borrow_mut();
        if let Some(listener) = listener.as_mut() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener(&event))) {
                warn!("cell listener panicked: {}", panic_message(payload.as_ref()));
            }
        }
    }

    /// Uncaches this cell. Its current callers are invalidated first,
    /// depth-first in the order they wired themselves in, then the callee
    /// edges are torn down and the nucleus dropped.
    fn invalidate_inner(&self) {
        let callers = match self.slot.borrow_mut().as_mut() {
            Some(nucleus) => nucleus.callers(),
            None => return,
        };
        {
            // this cell's own listener stays silent while upstream teardown
            // runs; other cells' listeners are not suppressed
            let _mute = self.mute();
            for caller in &callers {
                caller.invalidate();
            }
        }
        let this = self.ptr();
        let callees = match self.slot.borrow().as_ref() {
            Some(nucleus) => nucleus.callees.clone(),
            // a reentrant listener may already have torn this cell down
            None => return,
        };
        for callee in &callees {
            callee.remove_caller(&this);
        }
        *self.slot.borrow_mut() = None;
        self.emit(Event::Invalidated);
    }

    fn is_cached_checked(&self) -> Result<bool, Error> {
        self.guard_thread()?;
        Ok(self.slot.borrow().is_some())
    }

    fn callees_checked(&self) -> Result<Option<Vec<CellPtr>>, Error> {
        self.guard_thread()?;
        Ok(self.slot.borrow().as_ref().map(|n| n.callees.clone()))
    }

    fn callers_checked(&self) -> Result<Option<Vec<CellPtr>>, Error> {
        self.guard_thread()?;
        Ok(self.slot.borrow_mut().as_mut().map(|n| n.callers()))
    }
}

impl<T: Clone + 'static> CellInner<T> {
    fn get(&self) -> Result<T, Error> {
        self.guard_thread()?;
        if let Some(nucleus) = self.slot.borrow().as_ref() {
            let value = nucleus.value.clone();
            self.ctx.record(&self.ptr());
            return Ok(value);
        }

        // not cached: run the expression with a fresh frame on the stack; the
        // guard pops it again if the expression fails or panics
        let frame = FrameGuard::push(&self.ctx);
        let value = (self.expr.borrow_mut())()?;
        let callees = frame.finish();

        // wire the edges before installing the nucleus, so a listener
        // observing `Cached` sees a fully wired graph
        let this = self.ptr();
        for callee in &callees {
            callee.add_caller(&this);
        }
        *self.slot.borrow_mut() = Some(Nucleus::new(value.clone(), callees.clone()));
        self.emit(Event::Cached {
            value: value.clone(),
            callees,
        });
        self.ctx.record(&this);
        Ok(value)
    }

    fn set(&self, value: T) -> Result<(), Error> {
        self.guard_thread()?;
        self.guard_idle()?;
        {
            let _mute = self.mute();
            self.invalidate_inner();
            *self.slot.borrow_mut() = Some(Nucleus::new(value.clone(), Vec::new()));
        }
        self.emit(Event::Set { value });
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        self.guard_thread()?;
        self.guard_idle()?;
        {
            let _mute = self.mute();
            self.invalidate_inner();
        }
        self.emit(Event::Cleared);
        Ok(())
    }
}

impl<T: 'static> AnyCell for CellInner<T> {
    fn add_caller(&self, caller: &CellPtr) {
        {
            let mut slot = self.slot.borrow_mut();
            match slot.as_mut() {
                Some(nucleus) => nucleus.add_caller(caller),
                None => {
                    // unreachable under correct wiring: a callee is cached by
                    // the time its caller finishes evaluating
                    warn!("add_caller on an uncached cell");
                    return;
                }
            }
        }
        self.emit(Event::CallerAdded {
            caller: caller.clone(),
        });
    }

    fn remove_caller(&self, caller: &CellPtr) {
        let removed = match self.slot.borrow_mut().as_mut() {
            Some(nucleus) => nucleus.remove_caller(caller),
            None => false,
        };
        if removed {
            self.emit(Event::CallerRemoved {
                caller: caller.clone(),
            });
        }
    }

    fn invalidate(&self) {
        self.invalidate_inner();
    }

    fn is_cached(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

/// Restores the previous mute state even if the silenced block unwinds.
struct MuteGuard<'a> {
    flag: &'a Cell<bool>,
    prev: bool,
}

impl Drop for MuteGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.prev);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

//==================================================================================================

/// A cell whose value is computed on demand by its expression; read-only.
///
/// Reading it from inside another cell's expression records the dependency,
/// no matter how many plain function calls sit in between.
pub struct ReadCell<T> {
    inner: Rc<CellInner<T>>,
}

impl<T> Clone for ReadCell<T> {
    fn clone(&self) -> Self {
        ReadCell {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for ReadCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ReadCell")
            .field(&format_args!("{:#x}", Rc::as_ptr(&self.inner) as usize))
            .finish()
    }
}

impl<T: 'static> ReadCell<T> {
    /// Creates a cell computing its value with `expr`.
    ///
    /// The cell is bound to the creating thread; any use from another thread
    /// fails with [`Error::InvalidThread`]. An expression that reads itself,
    /// directly or transitively, panics.
    pub fn new(expr: impl FnMut() -> Result<T, Error> + 'static) -> ReadCell<T> {
        ReadCell {
            inner: CellInner::new(Box::new(expr), None),
        }
    }

    /// Like [`ReadCell::new`], with a listener observing this cell's
    /// lifecycle transitions.
    pub fn with_listener(
        expr: impl FnMut() -> Result<T, Error> + 'static,
        listener: impl FnMut(&Event<T>) + 'static,
    ) -> ReadCell<T> {
        ReadCell {
            inner: CellInner::new(Box::new(expr), Some(Box::new(listener))),
        }
    }

    /// Identity handle, comparable against [`callees`](ReadCell::callees) and
    /// [`callers`](ReadCell::callers) entries.
    pub fn ptr(&self) -> CellPtr {
        self.inner.ptr()
    }

    pub fn is_cached(&self) -> Result<bool, Error> {
        self.inner.is_cached_checked()
    }

    /// The cells read by the evaluation that produced the cached value, in
    /// first-read order. `None` iff the cell is uncached.
    pub fn callees(&self) -> Result<Option<Vec<CellPtr>>, Error> {
        self.inner.callees_checked()
    }

    /// The cached cells that read this one, in the order they first did.
    /// `None` iff the cell is uncached.
    pub fn callers(&self) -> Result<Option<Vec<CellPtr>>, Error> {
        self.inner.callers_checked()
    }
}

impl<T: Clone + 'static> ReadCell<T> {
    /// Returns the cell's value, evaluating the expression if it is not
    /// cached.
    pub fn get(&self) -> Result<T, Error> {
        self.inner.get()
    }
}

/// A cell that can additionally be assigned a value with `set`.
pub struct WriteCell<T> {
    inner: Rc<CellInner<T>>,
}

impl<T> Clone for WriteCell<T> {
    fn clone(&self) -> Self {
        WriteCell {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for WriteCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("WriteCell")
            .field(&format_args!("{:#x}", Rc::as_ptr(&self.inner) as usize))
            .finish()
    }
}

impl<T: 'static> WriteCell<T> {
    /// Creates a writable cell computing its initial value with `expr`.
    pub fn new(expr: impl FnMut() -> Result<T, Error> + 'static) -> WriteCell<T> {
        WriteCell {
            inner: CellInner::new(Box::new(expr), None),
        }
    }

    /// Like [`WriteCell::new`], with a listener.
    pub fn with_listener(
        expr: impl FnMut() -> Result<T, Error> + 'static,
        listener: impl FnMut(&Event<T>) + 'static,
    ) -> WriteCell<T> {
        WriteCell {
            inner: CellInner::new(Box::new(expr), Some(Box::new(listener))),
        }
    }

    /// A read-only view of this same cell.
    pub fn read(&self) -> ReadCell<T> {
        ReadCell {
            inner: self.inner.clone(),
        }
    }

    pub fn ptr(&self) -> CellPtr {
        self.inner.ptr()
    }

    pub fn is_cached(&self) -> Result<bool, Error> {
        self.inner.is_cached_checked()
    }

    pub fn callees(&self) -> Result<Option<Vec<CellPtr>>, Error> {
        self.inner.callees_checked()
    }

    pub fn callers(&self) -> Result<Option<Vec<CellPtr>>, Error> {
        self.inner.callers_checked()
    }
}

impl<T: Clone + 'static> WriteCell<T> {
    /// A writable cell whose expression yields `value`.
    pub fn value(value: T) -> WriteCell<T> {
        WriteCell::new(move || Ok(value.clone()))
    }

    pub fn get(&self) -> Result<T, Error> {
        self.inner.get()
    }

    /// Assigns `value`. The cell's current callers are invalidated first;
    /// the cell ends up cached with no callees. Forbidden while an
    /// evaluation is in progress.
    pub fn set(&self, value: T) -> Result<(), Error> {
        self.inner.set(value)
    }
}

/// A cell that can additionally be cleared back to uncached.
pub struct ClearCell<T> {
    inner: Rc<CellInner<T>>,
}

impl<T> Clone for ClearCell<T> {
    fn clone(&self) -> Self {
        ClearCell {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for ClearCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ClearCell")
            .field(&format_args!("{:#x}", Rc::as_ptr(&self.inner) as usize))
            .finish()
    }
}

impl<T: 'static> ClearCell<T> {
    /// Creates a clearable cell computing its value with `expr`.
    pub fn new(expr: impl FnMut() -> Result<T, Error> + 'static) -> ClearCell<T> {
        ClearCell {
            inner: CellInner::new(Box::new(expr), None),
        }
    }

    /// Like [`ClearCell::new`], with a listener.
    pub fn with_listener(
        expr: impl FnMut() -> Result<T, Error> + 'static,
        listener: impl FnMut(&Event<T>) + 'static,
    ) -> ClearCell<T> {
        ClearCell {
            inner: CellInner::new(Box::new(expr), Some(Box::new(listener))),
        }
    }

    /// A writable view of this same cell.
    pub fn write(&self) -> WriteCell<T> {
        WriteCell {
            inner: self.inner.clone(),
        }
    }

    /// A read-only view of this same cell.
    pub fn read(&self) -> ReadCell<T> {
        ReadCell {
            inner: self.inner.clone(),
        }
    }

    pub fn ptr(&self) -> CellPtr {
        self.inner.ptr()
    }

    pub fn is_cached(&self) -> Result<bool, Error> {
        self.inner.is_cached_checked()
    }

    pub fn callees(&self) -> Result<Option<Vec<CellPtr>>, Error> {
        self.inner.callees_checked()
    }

    pub fn callers(&self) -> Result<Option<Vec<CellPtr>>, Error> {
        self.inner.callers_checked()
    }
}

impl<T: Clone + 'static> ClearCell<T> {
    /// A clearable cell whose expression yields `value`.
    pub fn value(value: T) -> ClearCell<T> {
        ClearCell::new(move || Ok(value.clone()))
    }

    pub fn get(&self) -> Result<T, Error> {
        self.inner.get()
    }

    pub fn set(&self, value: T) -> Result<(), Error> {
        self.inner.set(value)
    }

    /// Discards the cached value, invalidating the current callers first.
    /// The next `get` re-runs the expression. Forbidden while an evaluation
    /// is in progress.
    pub fn clear(&self) -> Result<(), Error> {
        self.inner.clear()
    }
}

//==================================================================================================
// capability trait impls

impl<T: Clone + 'static> Readable<T> for ReadCell<T> {
    fn get(&self) -> Result<T, Error> {
        self.inner.get()
    }
}

impl<T: Clone + 'static> Readable<T> for WriteCell<T> {
    fn get(&self) -> Result<T, Error> {
        self.inner.get()
    }
}

impl<T: Clone + 'static> Writable<T> for WriteCell<T> {
    fn set(&self, value: T) -> Result<(), Error> {
        self.inner.set(value)
    }
}

impl<T: Clone + 'static> Readable<T> for ClearCell<T> {
    fn get(&self) -> Result<T, Error> {
        self.inner.get()
    }
}

impl<T: Clone + 'static> Writable<T> for ClearCell<T> {
    fn set(&self, value: T) -> Result<(), Error> {
        self.inner.set(value)
    }
}

impl<T: Clone + 'static> Clearable<T> for ClearCell<T> {
    fn clear(&self) -> Result<(), Error> {
        self.inner.clear()
    }
}

impl<T: 'static> GraphNode for ReadCell<T> {
    fn is_cached(&self) -> Result<bool, Error> {
        self.inner.is_cached_checked()
    }

    fn callees(&self) -> Result<Option<Vec<CellPtr>>, Error> {
        self.inner.callees_checked()
    }

    fn callers(&self) -> Result<Option<Vec<CellPtr>>, Error> {
        self.inner.callers_checked()
    }

    fn ptr(&self) -> CellPtr {
        self.inner.ptr()
    }
}

impl<T: 'static> GraphNode for WriteCell<T> {
    fn is_cached(&self) -> Result<bool, Error> {
        self.inner.is_cached_checked()
    }

    fn callees(&self) -> Result<Option<Vec<CellPtr>>, Error> {
        self.inner.callees_checked()
    }

    fn callers(&self) -> Result<Option<Vec<CellPtr>>, Error> {
        self.inner.callers_checked()
    }

    fn ptr(&self) -> CellPtr {
        self.inner.ptr()
    }
}

impl<T: 'static> GraphNode for ClearCell<T> {
    fn is_cached(&self) -> Result<bool, Error> {
        self.inner.is_cached_checked()
    }

    fn callees(&self) -> Result<Option<Vec<CellPtr>>, Error> {
        self.inner.callees_checked()
    }

    fn callers(&self) -> Result<Option<Vec<CellPtr>>, Error> {
        self.inner.callers_checked()
    }

    fn ptr(&self) -> CellPtr {
        self.inner.ptr()
    }
}

//==================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventKind;
    use std::cell::RefCell;

    #[test]
    fn get_caches_the_value() {
        let evals = Rc::new(Cell::new(0u32));
        let evals2 = evals.clone();
        let t = ReadCell::new(move || {
            evals2.set(evals2.get() + 1);
            Ok(7)
        });

        assert!(!t.is_cached().unwrap());
        assert_eq!(t.get().unwrap(), 7);
        assert!(t.is_cached().unwrap());
        assert_eq!(t.get().unwrap(), 7);
        assert_eq!(evals.get(), 1);
    }

    #[test]
    fn set_installs_a_value_with_no_callees() {
        let n = WriteCell::value(1);
        n.set(5).unwrap();
        assert!(n.is_cached().unwrap());
        assert_eq!(n.get().unwrap(), 5);
        assert_eq!(n.callees().unwrap(), Some(vec![]));
    }

    #[test]
    fn clear_uncaches_and_reevaluates() {
        let c = ClearCell::value(3);
        assert_eq!(c.get().unwrap(), 3);
        c.set(9).unwrap();
        assert_eq!(c.get().unwrap(), 9);
        c.clear().unwrap();
        assert!(!c.is_cached().unwrap());
        // back to the expression
        assert_eq!(c.get().unwrap(), 3);
    }

    #[test]
    fn edges_are_bidirectional() {
        let n = WriteCell::value(2);
        let n2 = n.clone();
        let t = ReadCell::new(move || Ok(n2.get()? * 10));

        assert_eq!(t.get().unwrap(), 20);
        assert_eq!(t.callees().unwrap(), Some(vec![n.ptr()]));
        assert_eq!(n.callers().unwrap(), Some(vec![t.ptr()]));
    }

    #[test]
    fn repeated_reads_record_one_callee() {
        let n = WriteCell::value(2);
        let n2 = n.clone();
        let t = ReadCell::new(move || Ok(n2.get()? + n2.get()? + n2.get()?));

        assert_eq!(t.get().unwrap(), 6);
        assert_eq!(t.callees().unwrap(), Some(vec![n.ptr()]));
        assert_eq!(n.callers().unwrap(), Some(vec![t.ptr()]));
    }

    #[test]
    fn upstream_set_invalidates_transitively() {
        let n = WriteCell::value(1);
        let n2 = n.clone();
        let a = ReadCell::new(move || Ok(n2.get()? + 1));
        let a2 = a.clone();
        let b = ReadCell::new(move || Ok(a2.get()? + 1));

        assert_eq!(b.get().unwrap(), 3);
        n.set(10).unwrap();
        assert!(!a.is_cached().unwrap());
        assert!(!b.is_cached().unwrap());
        // the old edges are gone
        assert_eq!(n.callers().unwrap(), Some(vec![]));
        assert_eq!(b.get().unwrap(), 12);
    }

    #[test]
    fn event_order_around_caching_and_set() {
        let log = Rc::new(RefCell::new(Vec::new()));

        let log_n = log.clone();
        let n = WriteCell::with_listener(
            move || Ok(1),
            move |event| log_n.borrow_mut().push(format!("n:{:?}", event.kind())),
        );
        let n2 = n.clone();
        let log_t = log.clone();
        let t = ReadCell::with_listener(
            move || Ok(n2.get()? + 1),
            move |event| log_t.borrow_mut().push(format!("t:{:?}", event.kind())),
        );

        assert_eq!(t.get().unwrap(), 2);
        // n caches first (it finishes evaluating inside t's evaluation), then
        // the caller wires in, then the caller's own Cached fires
        assert_eq!(
            *log.borrow(),
            vec![
                "n:Cached".to_string(),
                "n:CallerAdded".to_string(),
                "t:Cached".to_string()
            ]
        );

        log.borrow_mut().clear();
        n.set(5).unwrap();
        // n stays silent during teardown and emits exactly one Set; t observes
        // its own Invalidated
        assert_eq!(
            *log.borrow(),
            vec!["t:Invalidated".to_string(), "n:Set".to_string()]
        );
    }

    #[test]
    fn clear_emits_a_single_event() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log2 = log.clone();
        let c = ClearCell::with_listener(
            move || Ok(1),
            move |event| log2.borrow_mut().push(event.kind()),
        );

        c.get().unwrap();
        log.borrow_mut().clear();
        c.clear().unwrap();
        assert_eq!(*log.borrow(), vec![EventKind::Cleared]);
    }

    #[test]
    fn failed_expression_leaves_no_trace() {
        let n = WriteCell::value(1);
        let n2 = n.clone();
        let attempts = Rc::new(Cell::new(0u32));
        let attempts2 = attempts.clone();
        let t: ReadCell<i32> = ReadCell::new(move || {
            attempts2.set(attempts2.get() + 1);
            let _ = n2.get()?;
            Err(anyhow::anyhow!("nope").into())
        });

        assert!(matches!(t.get(), Err(Error::Eval(_))));
        assert!(!t.is_cached().unwrap());
        // the aborted evaluation wired no edges
        assert_eq!(n.callers().unwrap(), Some(vec![]));
        // and a later get tries again
        assert!(matches!(t.get(), Err(Error::Eval(_))));
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn panicking_listener_is_swallowed() {
        let n = WriteCell::with_listener(move || Ok(1), |_event| panic!("bad listener"));
        assert_eq!(n.get().unwrap(), 1);
        assert!(n.is_cached().unwrap());
        n.set(2).unwrap();
        assert_eq!(n.get().unwrap(), 2);
    }

    #[test]
    fn views_share_identity() {
        let c = ClearCell::value(1);
        let w = c.write();
        let r = c.read();
        assert_eq!(c.ptr(), w.ptr());
        assert_eq!(c.ptr(), r.ptr());

        w.set(4).unwrap();
        assert_eq!(r.get().unwrap(), 4);
    }
}
