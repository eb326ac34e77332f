//! Integration Tests for Graph Building
//!
//! These tests build whole scenes through the public API and check the
//! shape of the resulting graph.

use std::collections::HashSet;

use depsgraph_core::build::{build_graph, BuildOptions, NodeBuilder};
use depsgraph_core::graph::{ComponentKind, EvalCallback, Graph, OperationKind};
use depsgraph_core::source::{
    AnimData, ArmatureData, CollectionData, Driver, DriverKind, EntityId, EntityKind,
    GeometryData, MaterialData, NodeTreeData, ObjectData, ObjectType, RigidBodyWorld, SceneData,
    SourceEntity, SourceStore, TextureData, TextureStack, TreeNode, WorldData,
};

fn id(raw: u64) -> EntityId {
    EntityId::new(raw)
}

/// A scene using most entity kinds, including a shading cycle and a shared
/// texture.
fn production_scene() -> SourceStore {
    let mut store = SourceStore::new();
    let mut add = |raw: u64, entity: SourceEntity| store.insert(id(raw), entity).unwrap();

    add(
        1,
        SourceEntity::Scene(SceneData {
            name: "Shot".to_string(),
            objects: vec![id(10), id(11), id(12)],
            rigidbody_world: Some(RigidBodyWorld {
                collection: Some(id(60)),
            }),
            world: Some(id(50)),
            ..SceneData::default()
        }),
    );
    add(
        10,
        SourceEntity::Object(ObjectData {
            name: "Ground".to_string(),
            object_type: ObjectType::Mesh,
            data: Some(id(20)),
            ..ObjectData::default()
        }),
    );
    add(
        11,
        SourceEntity::Object(ObjectData {
            name: "Crate".to_string(),
            object_type: ObjectType::Mesh,
            parent: Some(id(10)),
            data: Some(id(20)),
            anim: Some(AnimData {
                drivers: vec![Driver::new(
                    "scale",
                    0,
                    DriverKind::Scripted {
                        expression: "1 + frame * 0.1".to_string(),
                    },
                )],
                ..AnimData::default()
            }),
            ..ObjectData::default()
        }),
    );
    add(
        12,
        SourceEntity::Object(ObjectData {
            name: "Rig".to_string(),
            object_type: ObjectType::Armature,
            data: Some(id(21)),
            ..ObjectData::default()
        }),
    );
    add(
        20,
        SourceEntity::Geometry(GeometryData {
            name: "Box".to_string(),
            materials: vec![Some(id(30)), Some(id(31))],
            ..Default::default()
        }),
    );
    add(
        21,
        SourceEntity::Armature(ArmatureData {
            name: "Skeleton".to_string(),
            bones: vec!["Root".to_string()],
            ..Default::default()
        }),
    );
    add(
        30,
        SourceEntity::Material(MaterialData {
            name: "Wood".to_string(),
            textures: TextureStack::new().with(0, id(40)).unwrap(),
            node_tree: Some(id(45)),
            ..MaterialData::default()
        }),
    );
    add(
        31,
        SourceEntity::Material(MaterialData {
            name: "Paint".to_string(),
            textures: TextureStack::new().with(2, id(40)).unwrap(),
            ..MaterialData::default()
        }),
    );
    add(
        40,
        SourceEntity::Texture(TextureData {
            name: "Grain".to_string(),
            node_tree: Some(id(45)),
            ..TextureData::default()
        }),
    );
    add(
        45,
        SourceEntity::NodeTree(NodeTreeData {
            name: "GrainNodes".to_string(),
            nodes: vec![
                TreeNode::new("Wood", Some(id(30))),
                TreeNode::new("Grain", Some(id(40))),
                TreeNode::new("Frame", None),
            ],
            ..NodeTreeData::default()
        }),
    );
    add(
        50,
        SourceEntity::World(WorldData {
            name: "Sky".to_string(),
            textures: TextureStack::new().with(0, id(40)).unwrap(),
            ..Default::default()
        }),
    );
    add(
        60,
        SourceEntity::Collection(CollectionData {
            name: "Simulated".to_string(),
            objects: vec![id(11)],
        }),
    );
    store
}

/// Test the basic driver scenario: one parentless object, two drivers.
#[test]
fn object_with_scripted_and_plain_driver() {
    let mut store = SourceStore::new();
    store
        .insert(
            id(1),
            SourceEntity::Scene(SceneData {
                objects: vec![id(2)],
                ..SceneData::default()
            }),
        )
        .unwrap();
    store
        .insert(
            id(2),
            SourceEntity::Object(ObjectData {
                anim: Some(AnimData {
                    drivers: vec![
                        Driver::new(
                            "location",
                            0,
                            DriverKind::Scripted {
                                expression: "sin(frame)".to_string(),
                            },
                        ),
                        Driver::new("location", 1, DriverKind::Average),
                    ],
                    ..AnimData::default()
                }),
                ..ObjectData::default()
            }),
        )
        .unwrap();

    let graph = build_graph(&store, id(1), BuildOptions::default()).unwrap();

    assert_eq!(graph.entity_count(), 2);
    assert_eq!(graph.entity_nodes_of_kind(EntityKind::Scene).count(), 1);
    assert_eq!(graph.time_source().map(|ts| ts.scene), Some(id(1)));

    let object = graph.entity_node(id(2)).unwrap();
    assert_eq!(object.component_count(), 3);
    assert!(object.has_component(ComponentKind::Parameters));

    let transform = object.find_component(ComponentKind::Transform).unwrap();
    assert_eq!(transform.operation_count(), 1);
    assert_eq!(transform.operations()[0].kind(), OperationKind::Init);

    let animation = object.find_component(ComponentKind::Animation).unwrap();
    assert_eq!(animation.operation_count(), 2);
    let flagged = animation
        .operations()
        .iter()
        .filter(|op| op.uses_scripting())
        .count();
    assert_eq!(flagged, 1);
    assert_eq!(graph.scripted_operations().count(), 1);
}

/// Test that two materials sharing a texture traverse it once.
#[test]
fn shared_texture_across_materials() {
    let mut store = SourceStore::new();
    let stack = TextureStack::new().with(0, id(30)).unwrap();
    for (raw, name) in [(10, "A"), (11, "B")] {
        store
            .insert(
                id(raw),
                SourceEntity::Material(MaterialData {
                    name: name.to_string(),
                    textures: stack.clone(),
                    ..MaterialData::default()
                }),
            )
            .unwrap();
    }
    store
        .insert(
            id(30),
            SourceEntity::Texture(TextureData {
                node_tree: Some(id(31)),
                anim: Some(AnimData {
                    drivers: vec![Driver::new("intensity", 0, DriverKind::Sum)],
                    ..AnimData::default()
                }),
                ..TextureData::default()
            }),
        )
        .unwrap();
    store
        .insert(id(31), SourceEntity::NodeTree(NodeTreeData::default()))
        .unwrap();
    store
        .insert(
            id(1),
            SourceEntity::Scene(SceneData {
                node_tree: Some(id(40)),
                ..SceneData::default()
            }),
        )
        .unwrap();
    store
        .insert(
            id(40),
            SourceEntity::NodeTree(NodeTreeData {
                nodes: vec![
                    TreeNode::new("A", Some(id(10))),
                    TreeNode::new("B", Some(id(11))),
                ],
                ..NodeTreeData::default()
            }),
        )
        .unwrap();

    let graph = build_graph(&store, id(1), BuildOptions::default()).unwrap();

    assert_eq!(graph.entity_nodes_of_kind(EntityKind::Texture).count(), 1);
    let animation = graph
        .find_component(id(30), ComponentKind::Animation)
        .unwrap();
    assert_eq!(animation.operation_count(), 1);
}

/// Test that a material used by two node-trees is built once.
#[test]
fn material_shared_by_node_trees() {
    let mut store = SourceStore::new();
    store
        .insert(
            id(1),
            SourceEntity::Scene(SceneData {
                world: Some(id(2)),
                node_tree: Some(id(20)),
                ..SceneData::default()
            }),
        )
        .unwrap();
    store
        .insert(
            id(2),
            SourceEntity::World(WorldData {
                node_tree: Some(id(21)),
                ..Default::default()
            }),
        )
        .unwrap();
    for tree in [20, 21] {
        store
            .insert(
                id(tree),
                SourceEntity::NodeTree(NodeTreeData {
                    nodes: vec![TreeNode::new("Material", Some(id(30)))],
                    ..NodeTreeData::default()
                }),
            )
            .unwrap();
    }
    store
        .insert(
            id(30),
            SourceEntity::Material(MaterialData {
                textures: TextureStack::new().with(4, id(31)).unwrap(),
                anim: Some(AnimData {
                    drivers: vec![Driver::new("diffuse_color", 0, DriverKind::Min)],
                    ..AnimData::default()
                }),
                ..MaterialData::default()
            }),
        )
        .unwrap();
    store
        .insert(id(31), SourceEntity::Texture(TextureData::default()))
        .unwrap();

    let graph = build_graph(&store, id(1), BuildOptions::default()).unwrap();

    assert_eq!(graph.entity_nodes_of_kind(EntityKind::Material).count(), 1);
    let material = graph.entity_node(id(30)).unwrap();
    assert_eq!(material.component_count(), 1);
    assert_eq!(material.operation_count(), 1);
    assert_eq!(graph.entity_nodes_of_kind(EntityKind::Texture).count(), 1);
}

/// Test that a child's parent operation follows its local transform.
#[test]
fn parent_operation_follows_local_transform() {
    let store = production_scene();
    let graph = build_graph(&store, id(1), BuildOptions::default()).unwrap();

    let ground = graph
        .find_component(id(10), ComponentKind::Transform)
        .unwrap();
    assert!(ground.find_operation(EvalCallback::ObjectParent).is_none());

    let crate_ops: Vec<_> = graph
        .find_component(id(11), ComponentKind::Transform)
        .unwrap()
        .operations()
        .iter()
        .map(|op| op.callback())
        .collect();
    assert_eq!(
        crate_ops,
        vec![
            EvalCallback::ObjectLocalTransform,
            EvalCallback::ObjectParent,
            EvalCallback::RigidbodySyncTransform,
        ]
    );
}

/// Test that every entity is built once and has at most one component per
/// kind.
#[test]
fn production_scene_structure() {
    let store = production_scene();
    let graph = build_graph(&store, id(1), BuildOptions::default()).unwrap();

    // Scene, 3 objects, geometry, armature, 2 materials, texture, node-tree,
    // world
    assert_eq!(graph.entity_count(), 11);

    for entity in graph.entity_nodes() {
        let mut kinds: Vec<_> = entity.components().map(|c| c.kind()).collect();
        let before = kinds.len();
        kinds.dedup();
        assert_eq!(kinds.len(), before, "duplicate component on {}", entity.id());

        for component in entity.components() {
            assert_eq!(component.owner(), entity.id());
        }
    }

    // Operation ids address their position in the graph
    let mut ids = HashSet::new();
    for (entity, component, op) in graph.operations() {
        assert_eq!(op.id().owner(), entity.id());
        assert_eq!(op.id().component(), component.kind());
        assert!(ids.insert(op.id()), "operation id {} used twice", op.id());
    }
    assert_eq!(ids.len(), graph.operation_count());

    // Shared geometry: one node, a Geometry component on each object
    assert_eq!(graph.entity_nodes_of_kind(EntityKind::Geometry).count(), 1);
    assert!(graph.find_component(id(10), ComponentKind::Geometry).is_some());
    assert!(graph.find_component(id(11), ComponentKind::Geometry).is_some());

    let pose = graph.find_component(id(12), ComponentKind::Pose).unwrap();
    assert_eq!(pose.operation_count(), 3);
}

/// Test that a second pass over the same data produces the same graph.
#[test]
fn repeated_passes_are_identical() {
    let store = production_scene();

    let mut first = NodeBuilder::new(&store);
    first.build_scene(id(1)).unwrap();
    let visited = first.visited_count();
    let first = first.finish();

    let mut second = NodeBuilder::new(&store);
    assert_eq!(second.visited_count(), 0);
    second.build_scene(id(1)).unwrap();
    assert_eq!(second.visited_count(), visited);
    let second = second.finish();

    assert_eq!(first, second);
    assert_eq!(first.to_msgpack().unwrap(), second.to_msgpack().unwrap());
}

/// Test loading a scene description from JSON.
#[test]
fn scene_from_json_description() {
    let json = r#"{ "entities": {
        "1": { "kind": "scene", "name": "Main", "objects": [2] },
        "2": {
            "kind": "object",
            "name": "Lamp",
            "object_type": "lamp",
            "data": 3,
            "constraints": [{ "name": "Track To" }]
        },
        "3": {
            "kind": "lamp",
            "name": "Key",
            "anim": {
                "drivers": [
                    { "rna_path": "energy", "kind": { "type": "scripted", "expression": "frame" } }
                ]
            }
        }
    } }"#;

    let store = SourceStore::from_json(json).unwrap();
    let graph = build_graph(&store, id(1), BuildOptions::default()).unwrap();

    let transform = graph
        .find_component(id(2), ComponentKind::Transform)
        .unwrap();
    assert!(transform
        .find_operation(EvalCallback::ConstraintStack)
        .is_some());
    assert_eq!(graph.entity_node(id(3)).unwrap().kind(), EntityKind::Lamp);
    assert_eq!(graph.scripted_operations().count(), 1);
}

/// Test that a finished graph survives a msgpack snapshot.
#[test]
fn snapshot_restores_graph() {
    let store = production_scene();
    let graph = build_graph(&store, id(1), BuildOptions::default()).unwrap();

    let bytes = graph.to_msgpack().unwrap();
    let restored = Graph::from_msgpack(&bytes).unwrap();
    assert_eq!(restored, graph);
}
