//! Source Graph Adapter
//!
//! This module is the read-only view over the authoring data that the graph
//! builder walks. Every piece of authoring data (scene, object, material, ...)
//! is a [`SourceEntity`] identified by a stable [`EntityId`].
//!
//! # Overview
//!
//! The builder never mutates the source. It only needs:
//!
//! - entity identity (`EntityId` equality and hashing)
//! - lookup of an entity by id, through the [`SourceGraph`] trait
//! - the relationships stored on each entity kind (parents, proxies, object
//!   data, texture stacks, node-trees, collections, ...)
//!
//! Anything that can hand out `&SourceEntity` for an id can drive a build.
//! [`SourceStore`] is the in-memory implementation used by tests, benchmarks
//! and JSON scene descriptions.

mod data;
mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use data::{
    AnimData, ArmatureData, CameraData, CollectionData, Constraint, Driver, DriverKind,
    GeometryData, GeometryType, LampData, MaterialData, Modifier, NodeTreeData, ObjectData,
    ObjectType, ParticleSystem, RigidBodyWorld, SceneData, SourceEntity, TextureData,
    TextureSlot, TextureStack, TreeNode, WorldData, MAX_TEXTURE_SLOTS,
};
pub use store::SourceStore;

/// Stable identity of a source entity.
///
/// Two references to the same authoring data always carry the same id, which
/// is what lets the builder deduplicate shared resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Create an id from its raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of authoring data kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Scene,
    Object,
    Geometry,
    Armature,
    Lamp,
    Camera,
    Material,
    Texture,
    NodeTree,
    World,
    Collection,
}

impl EntityKind {
    /// Whether this kind can be used as an object's data block.
    pub fn is_object_data(&self) -> bool {
        matches!(
            self,
            Self::Geometry | Self::Armature | Self::Lamp | Self::Camera
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scene => "scene",
            Self::Object => "object",
            Self::Geometry => "geometry",
            Self::Armature => "armature",
            Self::Lamp => "lamp",
            Self::Camera => "camera",
            Self::Material => "material",
            Self::Texture => "texture",
            Self::NodeTree => "node tree",
            Self::World => "world",
            Self::Collection => "collection",
        };
        f.write_str(name)
    }
}

/// Errors raised when the source data breaks the adapter contract.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// No entity is registered under this id.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// The entity exists but is not of the kind the reference requires.
    #[error("entity {id} is a {found}, expected a {expected}")]
    KindMismatch {
        id: EntityId,
        expected: EntityKind,
        found: EntityKind,
    },

    /// An object's data block is not geometry, armature, lamp or camera.
    #[error("entity {id} is a {found}, which cannot be object data")]
    NotObjectData { id: EntityId, found: EntityKind },

    /// Two entities were registered under the same id.
    #[error("entity {0} registered twice")]
    DuplicateEntity(EntityId),

    /// A reference points at an id that is not in the store.
    #[error("entity {from} references missing entity {to}")]
    DanglingReference { from: EntityId, to: EntityId },

    /// A texture slot index beyond the fixed stack size.
    #[error("texture slot {0} out of range (max {})", MAX_TEXTURE_SLOTS)]
    SlotOutOfRange(usize),

    /// The scene description could not be decoded.
    #[error("invalid scene description: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read-only access to authoring data.
///
/// Implementors only provide [`SourceGraph::entity`]; the typed accessors
/// are derived from it and report kind mismatches as [`SourceError`]s.
pub trait SourceGraph {
    /// Look up an entity by id.
    fn entity(&self, id: EntityId) -> Option<&SourceEntity>;

    /// Look up an entity, failing if it does not exist.
    fn lookup(&self, id: EntityId) -> Result<&SourceEntity, SourceError> {
        self.entity(id).ok_or(SourceError::UnknownEntity(id))
    }

    /// Look up a scene.
    fn scene(&self, id: EntityId) -> Result<&SceneData, SourceError> {
        let entity = self.lookup(id)?;
        entity
            .as_scene()
            .ok_or_else(|| mismatch(id, EntityKind::Scene, entity))
    }

    /// Look up an object.
    fn object(&self, id: EntityId) -> Result<&ObjectData, SourceError> {
        let entity = self.lookup(id)?;
        entity
            .as_object()
            .ok_or_else(|| mismatch(id, EntityKind::Object, entity))
    }

    /// Look up a material.
    fn material(&self, id: EntityId) -> Result<&MaterialData, SourceError> {
        let entity = self.lookup(id)?;
        entity
            .as_material()
            .ok_or_else(|| mismatch(id, EntityKind::Material, entity))
    }

    /// Look up a texture.
    fn texture(&self, id: EntityId) -> Result<&TextureData, SourceError> {
        let entity = self.lookup(id)?;
        entity
            .as_texture()
            .ok_or_else(|| mismatch(id, EntityKind::Texture, entity))
    }

    /// Look up a node-tree.
    fn node_tree(&self, id: EntityId) -> Result<&NodeTreeData, SourceError> {
        let entity = self.lookup(id)?;
        entity
            .as_node_tree()
            .ok_or_else(|| mismatch(id, EntityKind::NodeTree, entity))
    }

    /// Look up a world.
    fn world(&self, id: EntityId) -> Result<&WorldData, SourceError> {
        let entity = self.lookup(id)?;
        entity
            .as_world()
            .ok_or_else(|| mismatch(id, EntityKind::World, entity))
    }

    /// Look up a collection.
    fn collection(&self, id: EntityId) -> Result<&CollectionData, SourceError> {
        let entity = self.lookup(id)?;
        entity
            .as_collection()
            .ok_or_else(|| mismatch(id, EntityKind::Collection, entity))
    }
}

fn mismatch(id: EntityId, expected: EntityKind, found: &SourceEntity) -> SourceError {
    SourceError::KindMismatch {
        id,
        expected,
        found: found.kind(),
    }
}
