//! Object building.
//!
//! Every object gets Parameters and Transform components. Everything else
//! (constraints, animation, object data, particles) is only built when the
//! object has it.

use tracing::{debug, trace};

use super::{BuildError, NodeBuilder};
use crate::graph::{
    ComponentKind, EvalCallback, OperationContext, OperationFlags, OperationKind,
};
use crate::source::{
    ArmatureData, CameraData, EntityId, EntityKind, GeometryData, LampData, ObjectData,
    SourceEntity, SourceError, SourceGraph,
};

impl<'a, S: SourceGraph + ?Sized> NodeBuilder<'a, S> {
    /// Build an object. Objects reached a second time are skipped.
    pub(super) fn build_object(&mut self, object_id: EntityId) -> Result<(), BuildError> {
        let source = self.source;
        let object = source.object(object_id)?;

        if !self.visited.enter(object_id) {
            trace!(object = %object_id, "object already built");
            return Ok(());
        }
        debug!(object = %object_id, name = %object.name, "building object");

        self.graph
            .get_or_create_entity_node(object_id, EntityKind::Object, &object.name)
            .get_or_create_component(ComponentKind::Parameters);

        self.build_object_transform(object_id);

        // The parent's transform is read at evaluation time. Build order
        // between parent and child is not checked here.
        if object.parent.is_some() {
            self.expect_component(object_id, ComponentKind::Transform)
                .add_operation(
                    OperationKind::Exec,
                    EvalCallback::ObjectParent,
                    EvalCallback::ObjectParent.label(),
                    OperationContext::Entity(object_id),
                    OperationFlags::empty(),
                );
        }

        if !object.constraints.is_empty() {
            self.build_constraints(object_id, ComponentKind::Transform);
        }

        self.build_animdata(object_id)?;

        if self.options.build_object_data {
            if let Some(data_id) = object.data {
                self.build_object_data(object_id, object, data_id)?;
            }
        }

        if self.options.build_particles && !object.particle_systems.is_empty() {
            self.build_particles(object_id, object);
        }

        if self.options.build_instanced_collections {
            if let Some(collection_id) = object.instance_collection {
                self.queue_collection(collection_id);
            }
        }

        Ok(())
    }

    fn build_object_transform(&mut self, object_id: EntityId) {
        self.entity_mut(object_id)
            .get_or_create_component(ComponentKind::Transform)
            .add_operation(
                OperationKind::Init,
                EvalCallback::ObjectLocalTransform,
                EvalCallback::ObjectLocalTransform.label(),
                OperationContext::Entity(object_id),
                OperationFlags::empty(),
            );
    }

    /// The whole constraint stack runs as a single operation.
    fn build_constraints(&mut self, owner_id: EntityId, component: ComponentKind) {
        self.expect_component(owner_id, component).add_operation(
            OperationKind::Exec,
            EvalCallback::ConstraintStack,
            EvalCallback::ConstraintStack.label(),
            OperationContext::Entity(owner_id),
            OperationFlags::empty(),
        );
    }

    fn build_object_data(
        &mut self,
        object_id: EntityId,
        object: &ObjectData,
        data_id: EntityId,
    ) -> Result<(), BuildError> {
        let source = self.source;

        match source.lookup(data_id)? {
            SourceEntity::Geometry(geometry) => {
                self.build_geometry(object_id, object, data_id, geometry)
            }
            SourceEntity::Armature(armature) => self.build_rig(object_id, data_id, armature),
            SourceEntity::Lamp(lamp) => self.build_lamp(data_id, lamp),
            SourceEntity::Camera(camera) => self.build_camera(data_id, camera),
            other => Err(SourceError::NotObjectData {
                id: data_id,
                found: other.kind(),
            }
            .into()),
        }
    }

    /// Geometry: the object evaluates the data, then its modifier stack.
    fn build_geometry(
        &mut self,
        object_id: EntityId,
        object: &ObjectData,
        data_id: EntityId,
        geometry: &GeometryData,
    ) -> Result<(), BuildError> {
        let component = self
            .entity_mut(object_id)
            .get_or_create_component(ComponentKind::Geometry);

        component.add_operation(
            OperationKind::Init,
            EvalCallback::GeometryInit,
            EvalCallback::GeometryInit.label(),
            OperationContext::Entity(object_id),
            OperationFlags::empty(),
        );
        for (index, modifier) in object.modifiers.iter().enumerate() {
            component.add_operation(
                OperationKind::Exec,
                EvalCallback::Modifier,
                format!("{}: {}", EvalCallback::Modifier.label(), modifier.name),
                OperationContext::Element {
                    owner: object_id,
                    index,
                },
                OperationFlags::empty(),
            );
        }

        // Data shared by several objects is built with the first one
        if !self.visited.enter(data_id) {
            trace!(data = %data_id, "object data already built");
            return Ok(());
        }
        self.graph
            .get_or_create_entity_node(data_id, EntityKind::Geometry, &geometry.name);
        self.build_animdata(data_id)?;

        for &material_id in geometry.materials.iter().flatten() {
            self.build_material(material_id)?;
        }
        Ok(())
    }

    /// Armatures: a pose component with one operation per bone.
    fn build_rig(
        &mut self,
        object_id: EntityId,
        data_id: EntityId,
        armature: &ArmatureData,
    ) -> Result<(), BuildError> {
        let pose = self
            .entity_mut(object_id)
            .get_or_create_component(ComponentKind::Pose);

        pose.add_operation(
            OperationKind::Init,
            EvalCallback::PoseInit,
            EvalCallback::PoseInit.label(),
            OperationContext::Entity(object_id),
            OperationFlags::empty(),
        );
        for (index, bone) in armature.bones.iter().enumerate() {
            pose.add_operation(
                OperationKind::Exec,
                EvalCallback::Bone,
                format!("{}: {}", EvalCallback::Bone.label(), bone),
                OperationContext::Element {
                    owner: object_id,
                    index,
                },
                OperationFlags::empty(),
            );
        }
        pose.add_operation(
            OperationKind::Exec,
            EvalCallback::PoseDone,
            EvalCallback::PoseDone.label(),
            OperationContext::Entity(object_id),
            OperationFlags::empty(),
        );

        if !self.visited.enter(data_id) {
            trace!(data = %data_id, "object data already built");
            return Ok(());
        }
        self.graph
            .get_or_create_entity_node(data_id, EntityKind::Armature, &armature.name);
        self.build_animdata(data_id)
    }

    fn build_lamp(&mut self, data_id: EntityId, lamp: &LampData) -> Result<(), BuildError> {
        if !self.visited.enter(data_id) {
            trace!(data = %data_id, "object data already built");
            return Ok(());
        }

        self.graph
            .get_or_create_entity_node(data_id, EntityKind::Lamp, &lamp.name)
            .get_or_create_component(ComponentKind::Parameters)
            .add_operation(
                OperationKind::Exec,
                EvalCallback::LampParameters,
                EvalCallback::LampParameters.label(),
                OperationContext::Entity(data_id),
                OperationFlags::empty(),
            );
        self.build_animdata(data_id)?;

        if let Some(node_tree) = lamp.node_tree {
            self.build_node_tree(node_tree)?;
        }
        Ok(())
    }

    fn build_camera(&mut self, data_id: EntityId, camera: &CameraData) -> Result<(), BuildError> {
        if !self.visited.enter(data_id) {
            trace!(data = %data_id, "object data already built");
            return Ok(());
        }

        self.graph
            .get_or_create_entity_node(data_id, EntityKind::Camera, &camera.name)
            .get_or_create_component(ComponentKind::Parameters)
            .add_operation(
                OperationKind::Exec,
                EvalCallback::CameraParameters,
                EvalCallback::CameraParameters.label(),
                OperationContext::Entity(data_id),
                OperationFlags::empty(),
            );
        self.build_animdata(data_id)
    }

    fn build_particles(&mut self, object_id: EntityId, object: &ObjectData) {
        let particles = self
            .entity_mut(object_id)
            .get_or_create_component(ComponentKind::Particles);

        for (index, system) in object.particle_systems.iter().enumerate() {
            particles.add_operation(
                OperationKind::Simulate,
                EvalCallback::ParticleSystem,
                format!("{}: {}", EvalCallback::ParticleSystem.label(), system.name),
                OperationContext::Element {
                    owner: object_id,
                    index,
                },
                OperationFlags::empty(),
            );
        }
    }
}
