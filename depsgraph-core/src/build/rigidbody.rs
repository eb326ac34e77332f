//! Rigid body simulation.
//!
//! The simulation has two scene-level steps (rebuild the world, step the
//! simulation) and one per-participant step that copies the simulated
//! transform back onto the object. The per-participant step lives in the
//! object's Transform component, so participants must be built before
//! [`NodeBuilder::build_rigidbody`] runs. The scene routine guarantees this
//! by building participants in the object phase.

use tracing::debug;

use super::{BuildError, NodeBuilder};
use crate::graph::{
    ComponentKind, EvalCallback, OperationContext, OperationFlags, OperationKind,
};
use crate::source::{EntityId, ObjectType, RigidBodyWorld, SourceGraph};

impl<'a, S: SourceGraph + ?Sized> NodeBuilder<'a, S> {
    /// Build every object in the simulation collection.
    ///
    /// Objects already built through the scene are skipped by the visited
    /// set, so this only adds participants that live outside the scene.
    pub(super) fn build_rigidbody_participants(
        &mut self,
        rbw: &RigidBodyWorld,
    ) -> Result<(), BuildError> {
        let Some(collection_id) = rbw.collection else {
            return Ok(());
        };
        let source = self.source;

        for &object_id in &source.collection(collection_id)?.objects {
            self.build_object(object_id)?;
        }
        Ok(())
    }

    /// Build the scene-level simulation steps and hook up every mesh
    /// participant.
    ///
    /// # Panics
    ///
    /// Panics if a participant's Transform component has not been built.
    pub fn build_rigidbody(
        &mut self,
        scene_id: EntityId,
        rbw: &RigidBodyWorld,
    ) -> Result<(), BuildError> {
        let source = self.source;
        debug!(scene = %scene_id, "building rigidbody world");

        let scene_transform = self
            .entity_mut(scene_id)
            .get_or_create_component(ComponentKind::Transform);

        scene_transform.add_operation(
            OperationKind::Rebuild,
            EvalCallback::RigidbodyRebuild,
            EvalCallback::RigidbodyRebuild.label(),
            OperationContext::None,
            OperationFlags::empty(),
        );
        scene_transform.add_operation(
            OperationKind::Simulate,
            EvalCallback::RigidbodySimulate,
            EvalCallback::RigidbodySimulate.label(),
            OperationContext::None,
            OperationFlags::empty(),
        );

        let Some(collection_id) = rbw.collection else {
            return Ok(());
        };

        for &object_id in &source.collection(collection_id)?.objects {
            if source.object(object_id)?.object_type != ObjectType::Mesh {
                continue;
            }

            self.expect_component(object_id, ComponentKind::Transform)
                .add_operation(
                    OperationKind::Exec,
                    EvalCallback::RigidbodySyncTransform,
                    EvalCallback::RigidbodySyncTransform.label(),
                    OperationContext::Entity(object_id),
                    OperationFlags::empty(),
                );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{build_graph, BuildOptions};
    use crate::source::{
        CollectionData, EntityKind, ObjectData, SceneData, SourceEntity, SourceStore,
    };

    fn id(raw: u64) -> EntityId {
        EntityId::new(raw)
    }

    fn mesh(name: &str) -> SourceEntity {
        SourceEntity::Object(ObjectData {
            name: name.to_string(),
            object_type: ObjectType::Mesh,
            ..ObjectData::default()
        })
    }

    /// Scene 1 with objects 10 (mesh) and 11 (empty) in the rigidbody
    /// collection 20, plus mesh 12 that only lives in the collection.
    fn rigidbody_store() -> SourceStore {
        let mut store = SourceStore::new();
        store
            .insert(
                id(1),
                SourceEntity::Scene(SceneData {
                    objects: vec![id(10), id(11)],
                    rigidbody_world: Some(RigidBodyWorld {
                        collection: Some(id(20)),
                    }),
                    ..SceneData::default()
                }),
            )
            .unwrap();
        store.insert(id(10), mesh("Crate")).unwrap();
        store
            .insert(id(11), SourceEntity::Object(ObjectData::default()))
            .unwrap();
        store.insert(id(12), mesh("Debris")).unwrap();
        store
            .insert(
                id(20),
                SourceEntity::Collection(CollectionData {
                    name: "RigidBodyWorld".to_string(),
                    objects: vec![id(10), id(11), id(12)],
                }),
            )
            .unwrap();
        store
    }

    #[test]
    fn world_steps_live_on_scene_transform() {
        let store = rigidbody_store();
        let graph = build_graph(&store, id(1), BuildOptions::default()).unwrap();

        let transform = graph
            .find_component(id(1), ComponentKind::Transform)
            .unwrap();
        let kinds: Vec<_> = transform.operations().iter().map(|op| op.kind()).collect();
        assert_eq!(kinds, vec![OperationKind::Rebuild, OperationKind::Simulate]);
        assert_eq!(transform.operations()[0].name(), "Rigidbody World Rebuild");
        assert_eq!(
            transform.operations()[1].name(),
            "Rigidbody World Do Simulation"
        );
    }

    #[test]
    fn mesh_participants_get_sync_operation() {
        let store = rigidbody_store();
        let graph = build_graph(&store, id(1), BuildOptions::default()).unwrap();

        for mesh_id in [id(10), id(12)] {
            let transform = graph
                .find_component(mesh_id, ComponentKind::Transform)
                .unwrap();
            assert!(transform
                .find_operation(EvalCallback::RigidbodySyncTransform)
                .is_some());
        }

        // Non-mesh participants are not simulated
        let empty = graph
            .find_component(id(11), ComponentKind::Transform)
            .unwrap();
        assert!(empty
            .find_operation(EvalCallback::RigidbodySyncTransform)
            .is_none());
    }

    #[test]
    fn participants_are_not_built_twice() {
        let store = rigidbody_store();
        let graph = build_graph(&store, id(1), BuildOptions::default()).unwrap();

        let transform = graph
            .find_component(id(10), ComponentKind::Transform)
            .unwrap();
        assert_eq!(transform.operation_count(), 2);
        assert_eq!(graph.entity_nodes_of_kind(EntityKind::Object).count(), 3);
    }

    #[test]
    fn disabled_rigidbody_adds_nothing() {
        let store = rigidbody_store();
        let options = BuildOptions {
            build_rigidbody: false,
            ..BuildOptions::default()
        };
        let graph = build_graph(&store, id(1), options).unwrap();

        assert!(graph.find_component(id(1), ComponentKind::Transform).is_none());
        assert!(!graph.contains_entity(id(12)));
    }

    #[test]
    #[should_panic(expected = "has not been built")]
    fn unbuilt_participant_panics() {
        let store = rigidbody_store();
        let rbw = RigidBodyWorld {
            collection: Some(id(20)),
        };

        // Scene node exists, but the participants were never built
        let mut builder = NodeBuilder::new(&store);
        builder
            .graph
            .get_or_create_entity_node(id(1), EntityKind::Scene, "Scene");
        let _ = builder.build_rigidbody(id(1), &rbw);
    }
}
