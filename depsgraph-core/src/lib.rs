//! Depsgraph Core
//!
//! This crate builds the dependency graph of a scene: it turns authoring
//! data (scenes, objects, materials, node-trees, drivers, simulations) into
//! a graph of typed entity nodes, components and fine-grained operations
//! that an evaluation engine can schedule op-by-op.
//!
//! It implements:
//!
//! - A read-only adapter over authoring data
//! - The three-level node / component / operation registry
//! - The graph builder, a recursive visitor with per-pass cycle protection
//! - Graph snapshots for inspection and tooling
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `source`: Authoring data model and the [`SourceGraph`] adapter trait
//! - `graph`: Entity nodes, components, operations and the finished graph
//! - `build`: The traversal that fills a graph from a scene
//!
//! # Example
//!
//! ```rust
//! use depsgraph_core::build::{build_graph, BuildOptions};
//! use depsgraph_core::graph::ComponentKind;
//! use depsgraph_core::source::{EntityId, ObjectData, SceneData, SourceEntity, SourceStore};
//!
//! let scene = EntityId::new(1);
//! let cube = EntityId::new(2);
//!
//! let mut store = SourceStore::new();
//! store.insert(scene, SourceEntity::Scene(SceneData {
//!     objects: vec![cube],
//!     ..SceneData::default()
//! }))?;
//! store.insert(cube, SourceEntity::Object(ObjectData::default()))?;
//!
//! let graph = build_graph(&store, scene, BuildOptions::default())?;
//! assert!(graph.find_component(cube, ComponentKind::Transform).is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod build;
pub mod graph;
pub mod source;

pub use build::{build_graph, BuildError, BuildOptions, NodeBuilder};
pub use graph::Graph;
pub use source::{EntityId, SourceGraph, SourceStore};
