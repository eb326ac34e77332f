//! Per-pass visited set.

use std::collections::HashSet;

use crate::source::EntityId;

/// Entities already built in the current pass.
#[derive(Debug, Default)]
pub(crate) struct VisitedSet {
    ids: HashSet<EntityId>,
}

impl VisitedSet {
    /// Mark `id` as visited. Returns `false` if it already was.
    pub(crate) fn enter(&mut self, id: EntityId) -> bool {
        self.ids.insert(id)
    }

    pub(crate) fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }
}
