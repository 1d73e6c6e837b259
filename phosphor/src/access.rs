//! Read/write/clear access levels, abstract over engine cells and proxies.
use crate::{cell::CellPtr, error::Error};

/// Read access to a value.
pub trait Readable<T> {
    /// Returns the current value.
    fn get(&self) -> Result<T, Error>;
}

/// Read and write access.
pub trait Writable<T>: Readable<T> {
    /// Assigns a new value.
    fn set(&self, value: T) -> Result<(), Error>;
}

/// Read, write and clear access.
pub trait Clearable<T>: Writable<T> {
    /// Discards the current value.
    fn clear(&self) -> Result<(), Error>;
}

/// Dependency-graph introspection, available on engine-backed cells only.
///
/// Deliberately not a supertrait of [`Writable`]: a non-caching proxy can
/// stand in for a cell wherever only the access traits are required.
pub trait GraphNode {
    fn is_cached(&self) -> Result<bool, Error>;

    /// Cells read by the evaluation that produced the cached value, in
    /// first-read order. `None` iff the cell is uncached.
    fn callees(&self) -> Result<Option<Vec<CellPtr>>, Error>;

    /// Cached cells that read this one, in the order they first did.
    /// `None` iff the cell is uncached.
    fn callers(&self) -> Result<Option<Vec<CellPtr>>, Error>;

    /// Identity handle for comparison with [`callees`](GraphNode::callees)
    /// and [`callers`](GraphNode::callers) entries.
    fn ptr(&self) -> CellPtr;
}
