//! Component Nodes
//!
//! A component groups the operations that make up one cohesive aspect of an
//! entity's behavior. Operations are kept in insertion order, which is the
//! order they must run in within the component.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::operation::{
    EvalCallback, OperationContext, OperationFlags, OperationId, OperationKind, OperationNode,
};
use crate::source::EntityId;

/// The kind of component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Generic parameters. Also hosts node-tree evaluation for now.
    Parameters,

    /// Object (or scene-level simulation) transforms.
    Transform,

    /// Actions, NLA and drivers.
    Animation,

    /// Object geometry and its modifier stack.
    Geometry,

    /// Armature pose evaluation.
    Pose,

    /// Particle simulation.
    Particles,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parameters => "Parameters",
            Self::Transform => "Transform",
            Self::Animation => "Animation",
            Self::Geometry => "Geometry",
            Self::Pose => "Pose",
            Self::Particles => "Particles",
        };
        f.write_str(name)
    }
}

/// A component in the graph, owned by exactly one entity node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    kind: ComponentKind,

    /// The entity this component belongs to.
    owner: EntityId,

    /// Operations in execution order.
    operations: SmallVec<[OperationNode; 4]>,
}

impl ComponentNode {
    /// Create an empty component.
    pub fn new(owner: EntityId, kind: ComponentKind) -> Self {
        Self {
            kind,
            owner,
            operations: SmallVec::new(),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// The owning entity.
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Append an operation.
    ///
    /// There is no deduplication: two calls create two operations.
    pub fn add_operation(
        &mut self,
        kind: OperationKind,
        callback: EvalCallback,
        name: impl Into<String>,
        context: OperationContext,
        flags: OperationFlags,
    ) -> &mut OperationNode {
        let index = self.operations.len();
        let id = OperationId::new(self.owner, self.kind, index as u32);

        self.operations
            .push(OperationNode::new(id, kind, callback, name, context, flags));
        &mut self.operations[index]
    }

    /// Operations in execution order.
    pub fn operations(&self) -> &[OperationNode] {
        &self.operations
    }

    /// Find the first operation using `callback`.
    pub fn find_operation(&self, callback: EvalCallback) -> Option<&OperationNode> {
        self.operations.iter().find(|op| op.callback() == callback)
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }
}
