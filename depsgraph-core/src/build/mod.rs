//! Graph Builder
//!
//! The builder walks the source graph from a scene and creates the entity
//! nodes, components and operations for everything it reaches.
//!
//! # Algorithm
//!
//! Building is a single-threaded recursive descent. Each entity kind has its
//! own build routine, and routines recurse into the entities they reference:
//!
//! 1. Scene: scene node and time source, then the background (set) scene,
//!    then every object in the scene, then queued instancing collections,
//!    the rigidbody world, scene animation, the world and the compositor.
//! 2. Object: parameters, transform, constraints, animation, object data
//!    and particle systems.
//! 3. World, material, texture and node-tree: shared shading resources that
//!    may reference each other in cycles.
//!
//! # Visited Set
//!
//! Every entity enters the pass's visited set the first time it is built.
//! A second visit through another reference path is a silent skip, which
//! both terminates reference cycles and keeps shared resources from being
//! built twice. The set lives exactly as long as the pass and is dropped by
//! [`NodeBuilder::finish`], so no visited state outlives a build.
//!
//! # Failure Semantics
//!
//! Missing sub-data (no parent, no drivers, ...) is skipped. Broken source
//! data (unknown ids, wrong kinds) is reported as [`BuildError`]. A
//! component missing at a point where phase ordering guarantees it exists is
//! a bug in the builder and panics.

mod animation;
mod object;
mod options;
mod rigidbody;
mod scene;
mod shading;
mod visited;

use std::collections::VecDeque;

use tracing::{debug_span, info};

pub use options::BuildOptions;
use visited::VisitedSet;

use crate::graph::{ComponentKind, ComponentNode, EntityNode, Graph};
use crate::source::{EntityId, SourceError, SourceGraph};

/// Errors that abort a build pass.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The source graph broke its contract.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Build options could not be decoded.
    #[error("invalid build options: {0}")]
    Options(#[source] serde_json::Error),
}

/// Drives one build pass over a source graph.
pub struct NodeBuilder<'a, S: SourceGraph + ?Sized> {
    source: &'a S,
    options: BuildOptions,
    graph: Graph,
    visited: VisitedSet,

    /// Instancing collections waiting for the collection phase.
    pending_collections: VecDeque<EntityId>,
}

impl<'a, S: SourceGraph + ?Sized> NodeBuilder<'a, S> {
    /// Start a pass with default options.
    pub fn new(source: &'a S) -> Self {
        Self::with_options(source, BuildOptions::default())
    }

    /// Start a pass with explicit options.
    pub fn with_options(source: &'a S, options: BuildOptions) -> Self {
        Self {
            source,
            options,
            graph: Graph::new(),
            visited: VisitedSet::default(),
            pending_collections: VecDeque::new(),
        }
    }

    /// The graph built so far.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Whether `id` has been visited in this pass.
    pub fn is_visited(&self, id: EntityId) -> bool {
        self.visited.contains(id)
    }

    /// Number of entities visited in this pass.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// End the pass and take the finished graph.
    pub fn finish(self) -> Graph {
        info!(
            entities = self.graph.entity_count(),
            operations = self.graph.operation_count(),
            scripted = self.graph.scripted_operations().count(),
            visited = self.visited.len(),
            "depsgraph build finished"
        );
        self.graph
    }

    /// The node for an entity whose build routine already ran.
    fn entity_mut(&mut self, id: EntityId) -> &mut EntityNode {
        match self.graph.entity_node_mut(id) {
            Some(node) => node,
            None => panic!("entity {} has no node; it must be built first", id),
        }
    }

    /// A component that phase ordering guarantees to exist.
    fn expect_component(&mut self, id: EntityId, kind: ComponentKind) -> &mut ComponentNode {
        match self.graph.find_component_mut(id, kind) {
            Some(component) => component,
            None => panic!(
                "{} component of entity {} has not been built yet",
                kind, id
            ),
        }
    }
}

/// Build the graph for `scene` in a fresh pass.
pub fn build_graph<S: SourceGraph + ?Sized>(
    source: &S,
    scene: EntityId,
    options: BuildOptions,
) -> Result<Graph, BuildError> {
    let _span = debug_span!("depsgraph_build", %scene).entered();

    let mut builder = NodeBuilder::with_options(source, options);
    builder.build_scene(scene)?;
    Ok(builder.finish())
}
