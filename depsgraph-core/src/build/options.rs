//! Build configuration.

use serde::{Deserialize, Serialize};

use super::BuildError;

/// Which optional parts of the scene a pass builds.
///
/// Everything is enabled by default. Missing fields in a JSON description
/// keep their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Build the objects that scene objects are proxies for.
    pub build_proxies: bool,

    /// Build collections instanced by objects.
    pub build_instanced_collections: bool,

    /// Build the rigidbody world and its participants.
    pub build_rigidbody: bool,

    /// Build the scene's compositing node-tree.
    pub build_compositor: bool,

    /// Build object data (geometry, armatures, lamps, cameras).
    pub build_object_data: bool,

    /// Build particle systems.
    pub build_particles: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            build_proxies: true,
            build_instanced_collections: true,
            build_rigidbody: true,
            build_compositor: true,
            build_object_data: true,
            build_particles: true,
        }
    }
}

impl BuildOptions {
    /// Parse options from JSON.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        serde_json::from_str(json).map_err(BuildError::Options)
    }
}
