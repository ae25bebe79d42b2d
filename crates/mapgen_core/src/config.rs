//! Generator configuration.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Settings for one map generator.
///
/// Loaded from JSON or built in code; every field has a default so a partial
/// document is enough.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Cells along x.
    pub size_x: usize,
    /// Cells along z.
    pub size_z: usize,
    /// Cells along y. Maps are flat unless raised.
    pub height: usize,
    /// World units per cell.
    pub tile_size: f32,
    /// Transform the generated map is placed under.
    #[serde(skip)]
    pub parent: Transform,
    /// Fixed seed for reproducible maps. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Place the border ring once the map is done.
    pub add_border: bool,
    /// Propagate the boundary constraints before the first collapse.
    pub settle_boundary: bool,
    /// Scheduler steps taken per frame while playing.
    pub steps_per_frame: usize,
    /// Start generating as soon as the plugin is built.
    pub autostart: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            size_x: 5,
            size_z: 5,
            height: 1,
            tile_size: 2.0,
            parent: Transform::IDENTITY,
            seed: None,
            add_border: true,
            settle_boundary: true,
            steps_per_frame: 1,
            autostart: true,
        }
    }
}

impl GeneratorConfig {
    pub fn with_size(mut self, size_x: usize, size_z: usize) -> Self {
        self.size_x = size_x;
        self.size_z = size_z;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_border(mut self, add_border: bool) -> Self {
        self.add_border = add_border;
        self
    }
}
