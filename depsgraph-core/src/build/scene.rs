//! Scene-level building: the entry point of every pass.

use tracing::{debug, trace, warn};

use super::{BuildError, NodeBuilder};
use crate::graph::ComponentKind;
use crate::source::{EntityId, EntityKind, SourceGraph};

impl<'a, S: SourceGraph + ?Sized> NodeBuilder<'a, S> {
    /// Build the scene and everything reachable from it.
    ///
    /// Phases run in a fixed order. Objects (including rigidbody
    /// participants) are all built before the rigidbody world, which relies
    /// on their transform components.
    pub fn build_scene(&mut self, scene_id: EntityId) -> Result<(), BuildError> {
        let source = self.source;
        let scene = source.scene(scene_id)?;

        // Set scenes are assumed acyclic, but a loop in the linkage would
        // otherwise never terminate.
        if !self.visited.enter(scene_id) {
            warn!(scene = %scene_id, "scene already built, background scene chain loops");
            return Ok(());
        }
        debug!(scene = %scene_id, name = %scene.name, "building scene");

        self.graph
            .get_or_create_entity_node(scene_id, EntityKind::Scene, &scene.name);
        self.graph.add_time_source(scene_id);

        if let Some(set) = scene.set {
            self.build_scene(set)?;
        }

        for &object_id in &scene.objects {
            self.build_object(object_id)?;

            if self.options.build_proxies {
                if let Some(proxy) = source.object(object_id)?.proxy {
                    self.build_object(proxy)?;
                }
            }
        }

        let rigidbody_world = scene
            .rigidbody_world
            .as_ref()
            .filter(|_| self.options.build_rigidbody);

        if let Some(rbw) = rigidbody_world {
            self.build_rigidbody_participants(rbw)?;
        }

        self.build_pending_collections()?;

        if let Some(rbw) = rigidbody_world {
            self.build_rigidbody(scene_id, rbw)?;
        }

        self.build_animdata(scene_id)?;

        if let Some(world) = scene.world {
            self.build_world(world)?;
        }

        if self.options.build_compositor {
            if let Some(node_tree) = scene.node_tree {
                self.build_compositor(scene_id, node_tree)?;
            }
        }

        Ok(())
    }

    /// Queue a collection instanced by an object.
    pub(super) fn queue_collection(&mut self, collection_id: EntityId) {
        if !self.visited.contains(collection_id) {
            self.pending_collections.push_back(collection_id);
        }
    }

    /// Build queued collections until none are left.
    ///
    /// Member objects may instance further collections, which join the
    /// queue.
    fn build_pending_collections(&mut self) -> Result<(), BuildError> {
        while let Some(collection_id) = self.pending_collections.pop_front() {
            self.build_collection(collection_id)?;
        }
        Ok(())
    }

    fn build_collection(&mut self, collection_id: EntityId) -> Result<(), BuildError> {
        let source = self.source;
        let collection = source.collection(collection_id)?;

        if !self.visited.enter(collection_id) {
            trace!(collection = %collection_id, "collection already built");
            return Ok(());
        }

        self.graph.get_or_create_entity_node(
            collection_id,
            EntityKind::Collection,
            &collection.name,
        );

        for &object_id in &collection.objects {
            self.build_object(object_id)?;
        }
        Ok(())
    }

    /// Compositing node-trees are plain parameters for now.
    fn build_compositor(
        &mut self,
        scene_id: EntityId,
        node_tree: EntityId,
    ) -> Result<(), BuildError> {
        self.entity_mut(scene_id)
            .get_or_create_component(ComponentKind::Parameters);
        self.build_node_tree(node_tree)
    }
}
