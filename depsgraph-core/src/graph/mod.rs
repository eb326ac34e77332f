//! Dependency Graph
//!
//! This module holds the graph produced by a build pass: a three-level
//! structure of entity nodes, components and operations.
//!
//! # Overview
//!
//! - An [`EntityNode`] stands for one source entity (object, material, ...).
//! - A [`ComponentNode`] groups related work on that entity (transform,
//!   animation, geometry, ...). An entity has at most one component per kind.
//! - An [`OperationNode`] is one atomic unit of work the evaluation engine
//!   schedules. Operations inside a component run in insertion order.
//!
//! # Design Decisions
//!
//! 1. Nodes are owned by value and indexed by [`EntityId`]. Cross-entity
//!    wiring (e.g. rigidbody sync on an object's transform) goes through
//!    lookups by id, never through stored references.
//!
//! 2. All registries are insertion-ordered, so the same source always yields
//!    the same graph layout.
//!
//! 3. Edges between operations of different components are not stored here.
//!    They are added by a separate relation-building pass.

mod component;
mod node;
mod operation;
mod snapshot;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use component::{ComponentKind, ComponentNode};
pub use node::EntityNode;
pub use operation::{
    EvalCallback, OperationContext, OperationFlags, OperationId, OperationKind, OperationNode,
};
pub use snapshot::SnapshotError;

use crate::source::{EntityId, EntityKind};

/// The global time source driving every time-dependent operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSource {
    /// Scene whose frame clock drives the graph.
    pub scene: EntityId,
}

/// The graph built by one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Entity nodes, indexed by source identity.
    entities: IndexMap<EntityId, EntityNode>,

    time_source: Option<TimeSource>,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the node for `id`, creating it if this is the first reference.
    ///
    /// `kind` and `name` are only used when the node is created.
    pub fn get_or_create_entity_node(
        &mut self,
        id: EntityId,
        kind: EntityKind,
        name: &str,
    ) -> &mut EntityNode {
        let node = self
            .entities
            .entry(id)
            .or_insert_with(|| EntityNode::new(id, kind, name));
        debug_assert_eq!(node.kind(), kind, "entity {} changed kind", id);
        node
    }

    /// Get a node by entity id.
    pub fn entity_node(&self, id: EntityId) -> Option<&EntityNode> {
        self.entities.get(&id)
    }

    /// Get a mutable node by entity id.
    pub fn entity_node_mut(&mut self, id: EntityId) -> Option<&mut EntityNode> {
        self.entities.get_mut(&id)
    }

    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// All entity nodes in creation order.
    pub fn entity_nodes(&self) -> impl Iterator<Item = &EntityNode> {
        self.entities.values()
    }

    /// Entity nodes of one kind.
    pub fn entity_nodes_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &EntityNode> {
        self.entities.values().filter(move |node| node.kind() == kind)
    }

    /// Get the number of entity nodes.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Look up a component by owner and kind.
    pub fn find_component(&self, id: EntityId, kind: ComponentKind) -> Option<&ComponentNode> {
        self.entities.get(&id)?.find_component(kind)
    }

    /// Look up a component by owner and kind, for modification.
    pub fn find_component_mut(
        &mut self,
        id: EntityId,
        kind: ComponentKind,
    ) -> Option<&mut ComponentNode> {
        self.entities.get_mut(&id)?.find_component_mut(kind)
    }

    /// Add the global time source. Only the first call has an effect.
    pub fn add_time_source(&mut self, scene: EntityId) -> TimeSource {
        *self.time_source.get_or_insert(TimeSource { scene })
    }

    pub fn time_source(&self) -> Option<TimeSource> {
        self.time_source
    }

    /// Total number of operations in the graph.
    pub fn operation_count(&self) -> usize {
        self.entities.values().map(EntityNode::operation_count).sum()
    }

    /// Every operation with its owning entity and component.
    pub fn operations(
        &self,
    ) -> impl Iterator<Item = (&EntityNode, &ComponentNode, &OperationNode)> {
        self.entities.values().flat_map(|entity| {
            entity.components().flat_map(move |component| {
                component
                    .operations()
                    .iter()
                    .map(move |op| (entity, component, op))
            })
        })
    }

    /// Operations that need the scripting runtime.
    ///
    /// The evaluation engine must not run any two of these in parallel.
    pub fn scripted_operations(
        &self,
    ) -> impl Iterator<Item = (&EntityNode, &ComponentNode, &OperationNode)> {
        self.operations().filter(|(_, _, op)| op.uses_scripting())
    }
}
