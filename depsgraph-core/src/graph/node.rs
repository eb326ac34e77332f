//! Entity Nodes
//!
//! This module defines the per-entity node type. An entity node owns the
//! components built for one source entity, at most one per component kind.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::component::{ComponentKind, ComponentNode};
use crate::source::{EntityId, EntityKind};

/// A node in the dependency graph, one per source entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityNode {
    /// Identity of the source entity this node stands for.
    id: EntityId,

    /// What kind of entity this is.
    kind: EntityKind,

    /// Display name, copied from the source entity.
    name: String,

    /// Components in creation order, keyed by kind.
    components: IndexMap<ComponentKind, ComponentNode>,
}

impl EntityNode {
    /// Create a node with no components.
    pub fn new(id: EntityId, kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            components: IndexMap::new(),
        }
    }

    /// Get the node's entity ID.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Get the node's entity kind.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the component of `kind`, creating it if it does not exist yet.
    pub fn get_or_create_component(&mut self, kind: ComponentKind) -> &mut ComponentNode {
        let owner = self.id;
        self.components
            .entry(kind)
            .or_insert_with(|| ComponentNode::new(owner, kind))
    }

    /// Look up an existing component.
    pub fn find_component(&self, kind: ComponentKind) -> Option<&ComponentNode> {
        self.components.get(&kind)
    }

    /// Look up an existing component for modification.
    pub fn find_component_mut(&mut self, kind: ComponentKind) -> Option<&mut ComponentNode> {
        self.components.get_mut(&kind)
    }

    /// Check whether a component of `kind` exists.
    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.components.contains_key(&kind)
    }

    /// All components in creation order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentNode> {
        self.components.values()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Total number of operations across all components.
    pub fn operation_count(&self) -> usize {
        self.components.values().map(ComponentNode::operation_count).sum()
    }
}
