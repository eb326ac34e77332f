//! Authoring data kinds.
//!
//! These are plain data records. References between entities are stored as
//! [`EntityId`]s and resolved through a [`SourceGraph`](super::SourceGraph).

use serde::{Deserialize, Serialize};

use super::{EntityId, EntityKind, SourceError};

/// Number of slots in every texture stack.
pub const MAX_TEXTURE_SLOTS: usize = 18;

/// One piece of authoring data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceEntity {
    Scene(SceneData),
    Object(ObjectData),
    Geometry(GeometryData),
    Armature(ArmatureData),
    Lamp(LampData),
    Camera(CameraData),
    Material(MaterialData),
    Texture(TextureData),
    NodeTree(NodeTreeData),
    World(WorldData),
    Collection(CollectionData),
}

impl SourceEntity {
    /// The kind tag of this entity.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Scene(_) => EntityKind::Scene,
            Self::Object(_) => EntityKind::Object,
            Self::Geometry(_) => EntityKind::Geometry,
            Self::Armature(_) => EntityKind::Armature,
            Self::Lamp(_) => EntityKind::Lamp,
            Self::Camera(_) => EntityKind::Camera,
            Self::Material(_) => EntityKind::Material,
            Self::Texture(_) => EntityKind::Texture,
            Self::NodeTree(_) => EntityKind::NodeTree,
            Self::World(_) => EntityKind::World,
            Self::Collection(_) => EntityKind::Collection,
        }
    }

    /// Display name of the entity.
    pub fn name(&self) -> &str {
        match self {
            Self::Scene(d) => &d.name,
            Self::Object(d) => &d.name,
            Self::Geometry(d) => &d.name,
            Self::Armature(d) => &d.name,
            Self::Lamp(d) => &d.name,
            Self::Camera(d) => &d.name,
            Self::Material(d) => &d.name,
            Self::Texture(d) => &d.name,
            Self::NodeTree(d) => &d.name,
            Self::World(d) => &d.name,
            Self::Collection(d) => &d.name,
        }
    }

    /// Animation data attached to the entity, if the kind supports it.
    pub fn anim_data(&self) -> Option<&AnimData> {
        match self {
            Self::Scene(d) => d.anim.as_ref(),
            Self::Object(d) => d.anim.as_ref(),
            Self::Geometry(d) => d.anim.as_ref(),
            Self::Armature(d) => d.anim.as_ref(),
            Self::Lamp(d) => d.anim.as_ref(),
            Self::Camera(d) => d.anim.as_ref(),
            Self::Material(d) => d.anim.as_ref(),
            Self::Texture(d) => d.anim.as_ref(),
            Self::NodeTree(d) => d.anim.as_ref(),
            Self::World(d) => d.anim.as_ref(),
            Self::Collection(_) => None,
        }
    }

    pub fn as_scene(&self) -> Option<&SceneData> {
        match self {
            Self::Scene(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectData> {
        match self {
            Self::Object(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_material(&self) -> Option<&MaterialData> {
        match self {
            Self::Material(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_texture(&self) -> Option<&TextureData> {
        match self {
            Self::Texture(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_node_tree(&self) -> Option<&NodeTreeData> {
        match self {
            Self::NodeTree(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_world(&self) -> Option<&WorldData> {
        match self {
            Self::World(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionData> {
        match self {
            Self::Collection(d) => Some(d),
            _ => None,
        }
    }

    /// Every outgoing reference, paired with what it must resolve to.
    pub(crate) fn references(&self) -> Vec<(EntityId, RefTarget)> {
        let mut refs = Vec::new();
        let mut push = |id: Option<EntityId>, kind: RefTarget| {
            if let Some(id) = id {
                refs.push((id, kind));
            }
        };

        match self {
            Self::Scene(d) => {
                push(d.set, RefTarget::Kind(EntityKind::Scene));
                for &ob in &d.objects {
                    push(Some(ob), RefTarget::Kind(EntityKind::Object));
                }
                push(
                    d.rigidbody_world.as_ref().and_then(|rbw| rbw.collection),
                    RefTarget::Kind(EntityKind::Collection),
                );
                push(d.world, RefTarget::Kind(EntityKind::World));
                push(d.node_tree, RefTarget::Kind(EntityKind::NodeTree));
            }
            Self::Object(d) => {
                push(d.parent, RefTarget::Kind(EntityKind::Object));
                push(d.proxy, RefTarget::Kind(EntityKind::Object));
                push(d.data, RefTarget::ObjectData);
                push(d.instance_collection, RefTarget::Kind(EntityKind::Collection));
            }
            Self::Geometry(d) => {
                for &ma in d.materials.iter().flatten() {
                    push(Some(ma), RefTarget::Kind(EntityKind::Material));
                }
            }
            Self::Lamp(d) => push(d.node_tree, RefTarget::Kind(EntityKind::NodeTree)),
            Self::Material(d) => {
                for tex in d.textures.iter() {
                    push(Some(tex), RefTarget::Kind(EntityKind::Texture));
                }
                push(d.node_tree, RefTarget::Kind(EntityKind::NodeTree));
            }
            Self::Texture(d) => push(d.node_tree, RefTarget::Kind(EntityKind::NodeTree)),
            Self::NodeTree(d) => {
                for node in &d.nodes {
                    push(node.id, RefTarget::Any);
                }
            }
            Self::World(d) => {
                for tex in d.textures.iter() {
                    push(Some(tex), RefTarget::Kind(EntityKind::Texture));
                }
                push(d.node_tree, RefTarget::Kind(EntityKind::NodeTree));
            }
            Self::Collection(d) => {
                for &ob in &d.objects {
                    push(Some(ob), RefTarget::Kind(EntityKind::Object));
                }
            }
            Self::Armature(_) | Self::Camera(_) => {}
        }

        refs
    }
}

/// What a reference is allowed to point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefTarget {
    Kind(EntityKind),
    /// Geometry, armature, lamp or camera.
    ObjectData,
    /// Node-tree nodes dispatch on whatever they point at.
    Any,
}

impl RefTarget {
    pub(crate) fn accepts(&self, kind: EntityKind) -> bool {
        match self {
            Self::Kind(expected) => *expected == kind,
            Self::ObjectData => kind.is_object_data(),
            Self::Any => true,
        }
    }
}

/// Animation data: an action, NLA tracks and drivers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimData {
    /// Name of the active action, if any.
    pub action: Option<String>,
    /// Names of the NLA tracks.
    pub nla_tracks: Vec<String>,
    /// Driver curves, in evaluation order.
    pub drivers: Vec<Driver>,
}

impl AnimData {
    /// Whether there is anything to evaluate at all.
    pub fn is_animated(&self) -> bool {
        self.action.is_some() || !self.nla_tracks.is_empty() || !self.drivers.is_empty()
    }
}

/// A driver curve controlling one property channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    /// Path of the driven property.
    pub rna_path: String,
    /// Channel index within the property.
    #[serde(default)]
    pub array_index: usize,
    /// How the driver value is computed.
    pub kind: DriverKind,
}

impl Driver {
    pub fn new(rna_path: impl Into<String>, array_index: usize, kind: DriverKind) -> Self {
        Self {
            rna_path: rna_path.into(),
            array_index,
            kind,
        }
    }

    /// Whether evaluating this driver needs the scripting runtime.
    pub fn uses_scripting(&self) -> bool {
        matches!(self.kind, DriverKind::Scripted { .. })
    }
}

/// Driver evaluation type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DriverKind {
    Average,
    Sum,
    Min,
    Max,
    /// Value produced by a scripted expression.
    Scripted { expression: String },
}

/// A fixed-size stack of texture slots.
///
/// Serialized sparsely as a list of occupied slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TextureSlot>", into = "Vec<TextureSlot>")]
pub struct TextureStack {
    slots: [Option<EntityId>; MAX_TEXTURE_SLOTS],
}

/// One occupied slot of a [`TextureStack`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureSlot {
    pub slot: usize,
    pub texture: EntityId,
}

impl TextureStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a texture to a slot.
    pub fn set(&mut self, slot: usize, texture: Option<EntityId>) -> Result<(), SourceError> {
        let entry = self
            .slots
            .get_mut(slot)
            .ok_or(SourceError::SlotOutOfRange(slot))?;
        *entry = texture;
        Ok(())
    }

    /// Builder-style slot assignment.
    pub fn with(mut self, slot: usize, texture: EntityId) -> Result<Self, SourceError> {
        self.set(slot, Some(texture))?;
        Ok(self)
    }

    /// Texture in a slot, if occupied.
    pub fn get(&self, slot: usize) -> Option<EntityId> {
        self.slots.get(slot).copied().flatten()
    }

    /// Occupied slots in slot order, empty slots skipped.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

impl TryFrom<Vec<TextureSlot>> for TextureStack {
    type Error = SourceError;

    fn try_from(slots: Vec<TextureSlot>) -> Result<Self, Self::Error> {
        let mut stack = Self::new();
        for TextureSlot { slot, texture } in slots {
            stack.set(slot, Some(texture))?;
        }
        Ok(stack)
    }
}

impl From<TextureStack> for Vec<TextureSlot> {
    fn from(stack: TextureStack) -> Self {
        stack
            .slots
            .iter()
            .enumerate()
            .filter_map(|(slot, texture)| texture.map(|texture| TextureSlot { slot, texture }))
            .collect()
    }
}

/// A scene: the root of a build pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneData {
    pub name: String,
    /// Background scene linked into this one.
    pub set: Option<EntityId>,
    /// Objects placed in the scene, in base order.
    pub objects: Vec<EntityId>,
    pub rigidbody_world: Option<RigidBodyWorld>,
    pub anim: Option<AnimData>,
    pub world: Option<EntityId>,
    /// Compositing node-tree.
    pub node_tree: Option<EntityId>,
}

/// Scene-level rigid body simulation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidBodyWorld {
    /// Collection holding the simulation participants.
    pub collection: Option<EntityId>,
}

/// Object type tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    #[default]
    Empty,
    Mesh,
    Curve,
    Font,
    Surface,
    MetaBall,
    Lattice,
    Armature,
    Lamp,
    Camera,
}

/// An object placed in a scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectData {
    pub name: String,
    pub object_type: ObjectType,
    pub parent: Option<EntityId>,
    /// Object this one is a proxy for.
    pub proxy: Option<EntityId>,
    /// Object data block (geometry, armature, lamp or camera).
    pub data: Option<EntityId>,
    pub constraints: Vec<Constraint>,
    pub modifiers: Vec<Modifier>,
    pub particle_systems: Vec<ParticleSystem>,
    /// Collection instanced by this object.
    pub instance_collection: Option<EntityId>,
    pub anim: Option<AnimData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleSystem {
    pub name: String,
}

/// Geometry sub-type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryType {
    #[default]
    Mesh,
    Curve,
    Font,
    Surface,
    MetaBall,
    Lattice,
}

/// Geometry object data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryData {
    pub name: String,
    pub geometry_type: GeometryType,
    /// Material slots; empty slots are `None`.
    pub materials: Vec<Option<EntityId>>,
    pub anim: Option<AnimData>,
}

/// Armature object data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmatureData {
    pub name: String,
    pub bones: Vec<String>,
    pub anim: Option<AnimData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LampData {
    pub name: String,
    pub node_tree: Option<EntityId>,
    pub anim: Option<AnimData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraData {
    pub name: String,
    pub anim: Option<AnimData>,
}

/// A shading material.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialData {
    pub name: String,
    pub textures: TextureStack,
    pub node_tree: Option<EntityId>,
    pub anim: Option<AnimData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureData {
    pub name: String,
    pub node_tree: Option<EntityId>,
    pub anim: Option<AnimData>,
}

/// A node-tree: a list of nodes, some of which reference other entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeTreeData {
    pub name: String,
    pub nodes: Vec<TreeNode>,
    pub anim: Option<AnimData>,
}

/// A node inside a node-tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeNode {
    pub name: String,
    /// Entity used by the node (material, texture, or a node group).
    pub id: Option<EntityId>,
}

impl TreeNode {
    pub fn new(name: impl Into<String>, id: Option<EntityId>) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldData {
    pub name: String,
    pub textures: TextureStack,
    pub node_tree: Option<EntityId>,
    pub anim: Option<AnimData>,
}

/// A named group of objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionData {
    pub name: String,
    pub objects: Vec<EntityId>,
}
