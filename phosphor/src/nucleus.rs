//! Cache payload of a cached cell.
use crate::cell::{CellPtr, WeakCellPtr};
use smallvec::SmallVec;

/// The populated cache payload of a cell: the memoized value, the cells read
/// to produce it, and the cells that read it.
///
/// Callees are held strongly, callers weakly: a consumer cell dropped by the
/// program simply vanishes from the caller sets of its callees. Because a
/// caller/callee edge only forms once the callee is cached, strong ownership
/// is acyclic by construction.
pub(crate) struct Nucleus<T> {
    pub(crate) value: T,
    /// Cells read by the producing evaluation, deduplicated, in first-read
    /// order.
    pub(crate) callees: Vec<CellPtr>,
    /// Cells that read this one while evaluating, in the order they first
    /// wired themselves in. Push order is insertion order, and removal keeps
    /// it, so no separate counter is needed.
    callers: SmallVec<[WeakCellPtr; 4]>,
}

impl<T> Nucleus<T> {
    pub(crate) fn new(value: T, callees: Vec<CellPtr>) -> Nucleus<T> {
        Nucleus {
            value,
            callees,
            callers: SmallVec::new(),
        }
    }

    /// Appends `caller` to the caller set.
    pub(crate) fn add_caller(&mut self, caller: &CellPtr) {
        self.callers.push(caller.downgrade());
    }

    /// Removes the entry for `caller`. Returns whether an entry was removed;
    /// the entry may already be gone if the caller itself was reclaimed.
    pub(crate) fn remove_caller(&mut self, caller: &CellPtr) -> bool {
        let before = self.callers.len();
        self.callers.retain(|entry| entry.addr() != caller.addr());
        self.callers.len() != before
    }

    /// Live callers, in the order they first became callers. Entries whose
    /// cell has been reclaimed are scavenged along the way.
    pub(crate) fn callers(&mut self) -> Vec<CellPtr> {
        self.callers.retain(|entry| entry.is_alive());
        self.callers.iter().filter_map(WeakCellPtr::upgrade).collect()
    }
}
