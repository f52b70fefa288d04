//! The diff passed to `on_selection_change` before a bucket mutates
//!.

use diagraph_types::EntityId;
use indexmap::IndexSet;

/// What a pending selection mutation would change, computed before it is
/// applied so the handler can inspect it, override it, or cancel it.
#[derive(Debug, Clone)]
pub struct SelectionDiff {
    /// The full resulting set if the default action is applied unmodified.
    pub list: Vec<EntityId>,
    /// Ids that would newly become selected.
    pub added: Vec<EntityId>,
    /// Ids that would newly become deselected.
    pub removed: Vec<EntityId>,
}

impl SelectionDiff {
    pub(crate) fn between(current: &IndexSet<EntityId>, next: &IndexSet<EntityId>) -> Self {
        let added = next.iter().filter(|id| !current.contains(*id)).cloned().collect();
        let removed = current.iter().filter(|id| !next.contains(*id)).cloned().collect();
        Self {
            list: next.iter().cloned().collect(),
            added,
            removed,
        }
    }

    /// True when applying this diff would not change the selection at all.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
