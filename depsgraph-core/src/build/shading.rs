//! Shared shading resources: worlds, materials, textures and node-trees.
//!
//! These reference each other freely (a node-tree can use a material whose
//! texture has a node-tree that groups the first one), so every routine
//! goes through the visited set before doing any work.

use tracing::{debug, trace};

use super::{BuildError, NodeBuilder};
use crate::source::{EntityId, EntityKind, SourceEntity, SourceGraph, TextureStack};

impl<'a, S: SourceGraph + ?Sized> NodeBuilder<'a, S> {
    pub(super) fn build_world(&mut self, world_id: EntityId) -> Result<(), BuildError> {
        let source = self.source;
        let world = source.world(world_id)?;

        if !self.visited.enter(world_id) {
            trace!(world = %world_id, "world already built");
            return Ok(());
        }
        debug!(world = %world_id, name = %world.name, "building world");

        self.graph
            .get_or_create_entity_node(world_id, EntityKind::World, &world.name);
        self.build_animdata(world_id)?;
        self.build_texture_stack(&world.textures)?;

        if let Some(node_tree) = world.node_tree {
            self.build_node_tree(node_tree)?;
        }
        Ok(())
    }

    pub(super) fn build_material(&mut self, material_id: EntityId) -> Result<(), BuildError> {
        let source = self.source;
        let material = source.material(material_id)?;

        if !self.visited.enter(material_id) {
            trace!(material = %material_id, "material already built");
            return Ok(());
        }
        debug!(material = %material_id, name = %material.name, "building material");

        self.graph
            .get_or_create_entity_node(material_id, EntityKind::Material, &material.name);
        self.build_animdata(material_id)?;
        self.build_texture_stack(&material.textures)?;

        if let Some(node_tree) = material.node_tree {
            self.build_node_tree(node_tree)?;
        }
        Ok(())
    }

    fn build_texture_stack(&mut self, stack: &TextureStack) -> Result<(), BuildError> {
        for texture_id in stack.iter() {
            self.build_texture(texture_id)?;
        }
        Ok(())
    }

    fn build_texture(&mut self, texture_id: EntityId) -> Result<(), BuildError> {
        let source = self.source;
        let texture = source.texture(texture_id)?;

        if !self.visited.enter(texture_id) {
            trace!(texture = %texture_id, "texture already built");
            return Ok(());
        }
        debug!(texture = %texture_id, name = %texture.name, "building texture");

        self.graph
            .get_or_create_entity_node(texture_id, EntityKind::Texture, &texture.name);
        self.build_animdata(texture_id)?;

        if let Some(node_tree) = texture.node_tree {
            self.build_node_tree(node_tree)?;
        }
        Ok(())
    }

    /// Build a node-tree and the entities its nodes use.
    ///
    /// Node groups are nested node-trees, so a group that ends up containing
    /// itself is cut off by the visited set like any other cycle.
    pub(super) fn build_node_tree(&mut self, tree_id: EntityId) -> Result<(), BuildError> {
        let source = self.source;
        let tree = source.node_tree(tree_id)?;

        if !self.visited.enter(tree_id) {
            trace!(node_tree = %tree_id, "node tree already built");
            return Ok(());
        }
        debug!(node_tree = %tree_id, name = %tree.name, "building node tree");

        self.graph
            .get_or_create_entity_node(tree_id, EntityKind::NodeTree, &tree.name);
        self.build_animdata(tree_id)?;

        for node in &tree.nodes {
            let Some(used_id) = node.id else {
                continue;
            };

            match source.lookup(used_id)? {
                SourceEntity::Material(_) => self.build_material(used_id)?,
                SourceEntity::Texture(_) => self.build_texture(used_id)?,
                SourceEntity::NodeTree(_) => self.build_node_tree(used_id)?,
                other => {
                    trace!(
                        node_tree = %tree_id,
                        node = %node.name,
                        kind = %other.kind(),
                        "node uses an entity with no shading subgraph"
                    );
                }
            }
        }
        Ok(())
    }
}
