//! Core of the Map Generation Studio.
//!
//! This crate provides:
//! - Socket-based Wave Function Collapse over 3D tile grids (`wfc`)
//! - Tile catalog loading from Lua and JSON, with hot reload
//! - Step reports and listeners for observing a run
//! - Generator configuration and playback control
//! - A Bevy plugin that drives generation frame by frame

pub mod catalog_io;
pub mod catalog_reload;
pub mod config;
pub mod generator;
pub mod playback;
pub mod plugin;
pub mod rng;
pub mod wfc;

pub use catalog_io::{load_catalog, parse_catalog_json, parse_catalog_lua, CatalogDef, TileDef};
pub use catalog_reload::{CatalogReloadFlag, CatalogReloadPlugin, CatalogSource};
pub use config::GeneratorConfig;
pub use generator::{GeneratorListener, GeneratorListeners, StepReport, TilePlacement};
pub use playback::PlaybackState;
pub use plugin::{
    GeneratedTile, GenerationStatus, MapGenPlugin, MapGenSet, MapGenerated, RegenerateMap,
    TileMapGenerator, TilePlaced,
};
pub use rng::{GenRng, StdRandom};
pub use wfc::{
    border_ring, CatalogError, CompatibilityRule, Contradiction, ContradictionKind,
    ContradictionLog, Direction, ExactMatch, GenerationScheduler, GenerationState, Grid,
    GridError, PairTable, RunSummary, SocketLabel, TileCatalog, TileIndex, TileVariant,
};
