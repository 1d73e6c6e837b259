//! Implicit reactive cell cache.
//!
//! A cell holds an expression and, once read, its memoized value. Reading a
//! cell from inside another cell's expression is discovered automatically and
//! recorded as an edge in a dependency graph; when a cell changes, its
//! transitive readers are invalidated and recompute lazily on their next
//! read. No subscriptions, no manual dirty-marking.
//!
//! Cells are bound to the thread that created them. Each thread owns its own
//! evaluation context, so disjoint cell graphs on different threads evolve
//! independently; touching a cell from a foreign thread is an error.
//!
//! ```
//! use phosphor::{ReadCell, WriteCell};
//!
//! # fn main() -> Result<(), phosphor::Error> {
//! let celsius = WriteCell::value(20.0f64);
//! let c = celsius.clone();
//! let fahrenheit = ReadCell::new(move || Ok(c.get()? * 9.0 / 5.0 + 32.0));
//!
//! assert_eq!(fahrenheit.get()?, 68.0);
//! celsius.set(100.0)?;
//! assert_eq!(fahrenheit.get()?, 212.0);
//! # Ok(())
//! # }
//! ```

mod access;
mod cell;
mod context;
mod error;
mod event;
mod frame;
mod keyed;
mod nucleus;
mod proxy;

pub use access::{Clearable, GraphNode, Readable, Writable};
pub use cell::{CellPtr, ClearCell, ReadCell, WriteCell};
pub use error::Error;
pub use event::{Event, EventKind};
pub use keyed::CellMap;
pub use proxy::{ClearProxy, ReadProxy, WriteProxy};

#[cfg(test)]
mod tests {
    use crate::{ReadCell, WriteCell};

    #[test]
    fn it_works() {
        let n = WriteCell::value(1u32);
        let n2 = n.clone();
        let t = ReadCell::new(move || Ok(n2.get()? + 1));

        assert_eq!(t.get().unwrap(), 2);
        n.set(5).unwrap();
        assert_eq!(t.get().unwrap(), 6);
        assert_eq!(t.get().unwrap(), 6);
    }
}
