//! Step output and observers of a generation run.
//!
//! Provides the `GeneratorListener` trait for observing generation progress
//! and the `StepReport`/`TilePlacement` data describing each step.
//!
//! # Architecture
//!
//! - `TilePlacement`: one tile to instantiate at one grid position
//! - `StepReport`: everything a single scheduler step produced
//! - `GeneratorListener`: trait for anything that wants placements and the
//!   completion signal pushed to it
//! - `GeneratorListeners`: registry the scheduler notifies
//!
//! # Example
//!
//! ```ignore
//! struct NavBaker;
//!
//! impl GeneratorListener for NavBaker {
//!     fn on_complete(&mut self) {
//!         println!("map finished, baking navigation");
//!     }
//! }
//!
//! scheduler.add_listener(Box::new(NavBaker));
//! ```

use crate::wfc::{GenerationState, TileIndex};
use bevy::math::{IVec3, Vec3};
use bevy::transform::components::Transform;

/// A tile the rendering side should place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlacement {
    /// Grid position. Border tiles lie outside the grid.
    pub pos: IVec3,
    /// Catalog index of the placed variant.
    pub tile: TileIndex,
    /// Placed by the border ring rather than the solver.
    pub border: bool,
}

impl TilePlacement {
    /// World-space position: `(x, y, z) * tile_size` under `parent`.
    pub fn world_position(&self, tile_size: f32, parent: &Transform) -> Vec3 {
        parent.transform_point(self.pos.as_vec3() * tile_size)
    }
}

/// What one call to `advance()` or `step()` produced.
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    /// Number of completed Selecting/Collapsing/Propagating cycles so far.
    pub step_number: usize,
    /// State the scheduler is in after the call.
    pub state: GenerationState,
    /// Cell chosen and the variant it collapsed to, if a collapse happened.
    pub collapsed: Option<(IVec3, TileIndex)>,
    /// Tiles that became final during the call.
    pub placements: Vec<TilePlacement>,
    /// The completion signal fired during this call.
    pub completed: bool,
}

impl StepReport {
    pub(crate) fn merge(&mut self, other: StepReport) {
        self.step_number = other.step_number;
        self.state = other.state;
        if other.collapsed.is_some() {
            self.collapsed = other.collapsed;
        }
        self.placements.extend(other.placements);
        self.completed |= other.completed;
    }
}

/// Trait for anything that observes a generation run.
///
/// All methods have empty defaults so a listener only implements what it
/// cares about.
pub trait GeneratorListener: Send + Sync {
    /// Called for every tile that becomes final, border tiles included.
    fn on_placed(&mut self, _placement: &TilePlacement) {}

    /// Called exactly once per run, when the scheduler reaches `Complete`.
    fn on_complete(&mut self) {}

    /// Called when a run starts or is cancelled.
    fn on_reset(&mut self) {}
}

/// Registered listeners, notified in registration order.
#[derive(Default)]
pub struct GeneratorListeners {
    listeners: Vec<Box<dyn GeneratorListener>>,
}

impl GeneratorListeners {
    pub fn add(&mut self, listener: Box<dyn GeneratorListener>) {
        self.listeners.push(listener);
    }

    pub fn notify_placed(&mut self, placement: &TilePlacement) {
        for listener in &mut self.listeners {
            listener.on_placed(placement);
        }
    }

    pub fn notify_complete(&mut self) {
        for listener in &mut self.listeners {
            listener.on_complete();
        }
    }

    pub fn notify_reset(&mut self) {
        for listener in &mut self.listeners {
            listener.on_reset();
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_world_position_scales_and_transforms() {
        let placement = TilePlacement {
            pos: IVec3::new(1, 0, 2),
            tile: 0,
            border: false,
        };
        assert_eq!(
            placement.world_position(2.0, &Transform::IDENTITY),
            Vec3::new(2.0, 0.0, 4.0)
        );

        let parent = Transform::from_xyz(10.0, 1.0, -5.0);
        assert_eq!(
            placement.world_position(2.0, &parent),
            Vec3::new(12.0, 1.0, -1.0)
        );
    }

    #[derive(Default)]
    struct Counts {
        placed: usize,
        completed: usize,
        resets: usize,
    }

    struct CountingListener(Arc<Mutex<Counts>>);

    impl GeneratorListener for CountingListener {
        fn on_placed(&mut self, _placement: &TilePlacement) {
            self.0.lock().unwrap().placed += 1;
        }

        fn on_complete(&mut self) {
            self.0.lock().unwrap().completed += 1;
        }

        fn on_reset(&mut self) {
            self.0.lock().unwrap().resets += 1;
        }
    }

    #[test]
    fn test_listeners_are_notified() {
        let counts = Arc::new(Mutex::new(Counts::default()));
        let mut listeners = GeneratorListeners::default();
        listeners.add(Box::new(CountingListener(counts.clone())));
        assert_eq!(listeners.len(), 1);

        let placement = TilePlacement {
            pos: IVec3::ZERO,
            tile: 1,
            border: true,
        };
        listeners.notify_placed(&placement);
        listeners.notify_placed(&placement);
        listeners.notify_complete();
        listeners.notify_reset();

        let counts = counts.lock().unwrap();
        assert_eq!(counts.placed, 2);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.resets, 1);
    }

    #[test]
    fn test_report_merge_accumulates_placements() {
        let mut report = StepReport::default();
        report.merge(StepReport {
            step_number: 1,
            state: GenerationState::Propagating,
            collapsed: Some((IVec3::ZERO, 0)),
            placements: vec![TilePlacement {
                pos: IVec3::ZERO,
                tile: 0,
                border: false,
            }],
            completed: false,
        });
        report.merge(StepReport {
            step_number: 1,
            state: GenerationState::Selecting,
            ..Default::default()
        });
        assert_eq!(report.state, GenerationState::Selecting);
        assert_eq!(report.collapsed, Some((IVec3::ZERO, 0)));
        assert_eq!(report.placements.len(), 1);
        assert!(!report.completed);
    }
}
