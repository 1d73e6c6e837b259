//! Cell lifecycle notifications.
use crate::cell::CellPtr;

/// Notification delivered to a cell's listener.
///
/// Events are delivered synchronously on the cell's owning thread, immediately
/// after the state transition they describe. A panicking listener is caught
/// and logged; it never affects graph state.
#[derive(Clone, Debug)]
pub enum Event<T> {
    /// The cell went from uncached to cached by evaluating its expression.
    ///
    /// Carries the computed value and the cells read during the evaluation,
    /// deduplicated, in first-read order.
    Cached { value: T, callees: Vec<CellPtr> },
    /// The cell went from cached to uncached, either because an upstream cell
    /// changed or because it was invalidated explicitly.
    Invalidated,
    /// A value was assigned with `set`.
    Set { value: T },
    /// The cell was cleared with `clear`.
    Cleared,
    /// A cell that read this one during its own evaluation wired itself in as
    /// a caller.
    CallerAdded { caller: CellPtr },
    /// A caller's edge to this cell was torn down.
    CallerRemoved { caller: CellPtr },
}

/// Discriminant of an [`Event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Cached,
    Invalidated,
    Set,
    Cleared,
    CallerAdded,
    CallerRemoved,
}

impl<T> Event<T> {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Cached { .. } => EventKind::Cached,
            Event::Invalidated => EventKind::Invalidated,
            Event::Set { .. } => EventKind::Set,
            Event::Cleared => EventKind::Cleared,
            Event::CallerAdded { .. } => EventKind::CallerAdded,
            Event::CallerRemoved { .. } => EventKind::CallerRemoved,
        }
    }
}
