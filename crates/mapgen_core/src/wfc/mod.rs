//! Socket-based Wave Function Collapse for tile maps.
//!
//! A map is a 3D grid of cells. Every cell starts able to hold any tile of a
//! `TileCatalog`; the `GenerationScheduler` repeatedly collapses the cell with
//! the fewest options left and propagates the consequences until every cell
//! is decided (or left as a gap where the catalog had nothing to offer).
//!
//! # Coordinates
//!
//! North is +z, East is +x, Top is +y. The map edge is the ring
//! x = 0 (West), x = size_x - 1 (East), z = 0 (South), z = size_z - 1 (North).
//!
//! # Example
//!
//! ```ignore
//! let catalog = Arc::new(load_catalog("assets/tiles/town.lua")?);
//! let mut scheduler = GenerationScheduler::new(catalog, GeneratorConfig::default())?;
//! scheduler.start();
//! let report = scheduler.run_to_completion();
//! for placement in report.placements {
//!     // spawn the tile at placement.world_position(...)
//! }
//! ```

pub mod border;
pub mod catalog;
pub mod collapse;
pub mod contradiction;
pub mod direction;
pub mod entropy;
pub mod grid;
pub mod propagator;
pub mod scheduler;
pub mod socket;

pub use border::border_ring;
pub use catalog::{CatalogError, DeadFace, TileCatalog, TileCatalogBuilder, TileIndex, TileVariant};
pub use collapse::collapse_cell;
pub use contradiction::{Contradiction, ContradictionKind, ContradictionLog};
pub use direction::{Direction, DIRECTION_COUNT};
pub use entropy::{choose_candidate, lowest_entropy_cells, Selection};
pub use grid::{Cell, Domain, Grid, GridError};
pub use propagator::{PropagationOutcome, Propagator};
pub use scheduler::{GenerationScheduler, GenerationState, RunSummary};
pub use socket::{CompatibilityRule, ExactMatch, PairTable, SocketLabel};
