//! Operation Nodes
//!
//! Operations are the atomic units of evaluatable work. Each one names the
//! callback the evaluation engine should run, the data it runs on, and any
//! scheduling hints.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::component::ComponentKind;
use crate::source::EntityId;

/// Identifier for an operation: its position in the graph.
///
/// An operation is addressed by its owning entity, the component it lives
/// in and its index in that component's execution order. Building the same
/// source twice yields the same ids, and a relation pass can refer to an
/// operation without holding a reference into the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId {
    owner: EntityId,
    component: ComponentKind,
    index: u32,
}

impl OperationId {
    pub fn new(owner: EntityId, component: ComponentKind, index: u32) -> Self {
        Self {
            owner,
            component,
            index,
        }
    }

    /// The entity owning the operation.
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn component(&self) -> ComponentKind {
        self.component
    }

    /// Position within the component's execution order.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.component, self.index)
    }
}

/// The role an operation plays within its component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Prepares state. Runs before the component's exec operations.
    Init,

    /// Regular evaluation step.
    Exec,

    /// One step of a time-dependent simulation.
    Simulate,

    /// Rebuilds a simulation from scratch. Runs sparingly (file load,
    /// rewinding to the start frame).
    Rebuild,
}

/// The evaluation routine an operation invokes.
///
/// This is a closed set: the evaluation engine maps each variant to its
/// implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalCallback {
    ObjectLocalTransform,
    ObjectParent,
    ConstraintStack,
    Driver,
    RigidbodyRebuild,
    RigidbodySimulate,
    RigidbodySyncTransform,
    GeometryInit,
    Modifier,
    PoseInit,
    Bone,
    PoseDone,
    LampParameters,
    CameraParameters,
    ParticleSystem,
}

impl EvalCallback {
    /// The default display name for operations using this callback.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ObjectLocalTransform => "Local Transform",
            Self::ObjectParent => "Parent",
            Self::ConstraintStack => "Constraint Stack",
            Self::Driver => "Driver",
            Self::RigidbodyRebuild => "Rigidbody World Rebuild",
            Self::RigidbodySimulate => "Rigidbody World Do Simulation",
            Self::RigidbodySyncTransform => "Rigidbody Object Sync",
            Self::GeometryInit => "Geometry Init",
            Self::Modifier => "Modifier",
            Self::PoseInit => "Init Pose",
            Self::Bone => "Bone",
            Self::PoseDone => "Pose Done",
            Self::LampParameters => "Lamp Parameters",
            Self::CameraParameters => "Camera Parameters",
            Self::ParticleSystem => "Particle System",
        }
    }
}

impl fmt::Display for EvalCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The data an operation's callback runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationContext {
    /// The callback needs no entity data (scene-wide simulation steps).
    #[default]
    None,

    /// A whole entity.
    Entity(EntityId),

    /// The driver curve at `index` in the owner's driver list.
    Driver { owner: EntityId, index: usize },

    /// Another indexed element of the owner: a modifier, bone or particle
    /// system.
    Element { owner: EntityId, index: usize },
}

bitflags! {
    /// Scheduling hints attached to an operation.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct OperationFlags: u32 {
        /// The callback runs code in the external scripting runtime. Such
        /// operations must not run in parallel with each other.
        const USES_SCRIPTING = 1 << 0;
    }
}

/// An operation in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationNode {
    id: OperationId,
    kind: OperationKind,
    callback: EvalCallback,
    name: String,
    context: OperationContext,
    flags: OperationFlags,
}

impl OperationNode {
    /// Create a new operation.
    pub fn new(
        id: OperationId,
        kind: OperationKind,
        callback: EvalCallback,
        name: impl Into<String>,
        context: OperationContext,
        flags: OperationFlags,
    ) -> Self {
        Self {
            id,
            kind,
            callback,
            name: name.into(),
            context,
            flags,
        }
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn callback(&self) -> EvalCallback {
        self.callback
    }

    /// Human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> OperationContext {
        self.context
    }

    pub fn flags(&self) -> OperationFlags {
        self.flags
    }

    /// Add flags to the operation.
    pub fn set_flags(&mut self, flags: OperationFlags) {
        self.flags |= flags;
    }

    /// Whether the operation needs the scripting runtime.
    pub fn uses_scripting(&self) -> bool {
        self.flags.contains(OperationFlags::USES_SCRIPTING)
    }
}
