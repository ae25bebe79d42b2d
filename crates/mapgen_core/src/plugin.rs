//! Bevy plugin driving map generation frame by frame.
//!
//! The plugin owns the scheduler and turns its step reports into messages:
//! a `TilePlaced` for every placement and one `MapGenerated` per run. It does
//! not spawn anything itself; the rendering side reads `TilePlaced`, spawns
//! geometry and tags it with `GeneratedTile` so a `RegenerateMap` can clear it.

use crate::config::GeneratorConfig;
use crate::generator::TilePlacement;
use crate::playback::PlaybackState;
use crate::wfc::{GenerationScheduler, GenerationState, RunSummary, TileCatalog};
use bevy::prelude::*;
use std::sync::Arc;

/// Runs the generator in `Update`.
pub struct MapGenPlugin {
    pub catalog: Arc<TileCatalog>,
    pub config: GeneratorConfig,
}

impl MapGenPlugin {
    pub fn new(catalog: TileCatalog, config: GeneratorConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config,
        }
    }
}

impl Plugin for MapGenPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<TilePlaced>()
            .add_message::<MapGenerated>()
            .add_message::<RegenerateMap>()
            .insert_resource(self.config.clone())
            .insert_resource(GenerationStatus::default())
            .insert_resource(PlaybackState::default());

        let scheduler = GenerationScheduler::new(self.catalog.clone(), self.config.clone());
        let mut scheduler = match scheduler {
            Ok(scheduler) => scheduler,
            Err(e) => {
                error!("Map generator disabled: {}", e);
                return;
            }
        };

        if self.config.autostart {
            scheduler.start();
            app.insert_resource(PlaybackState::playing());
        }

        app.insert_resource(TileMapGenerator { scheduler })
            .add_systems(
                Update,
                (handle_regenerate, drive_generator)
                    .chain()
                    .in_set(MapGenSet),
            );
    }
}

/// System set containing the generator systems. Consumers of `TilePlaced`
/// should run after it to see placements in the same frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapGenSet;

/// The scheduler of the running map.
#[derive(Resource)]
pub struct TileMapGenerator {
    pub scheduler: GenerationScheduler,
}

/// A tile became final and should be instantiated.
#[derive(Message, Debug, Clone)]
pub struct TilePlaced {
    pub placement: TilePlacement,
    /// `(x, y, z) * tile_size` under the configured parent transform.
    pub world_position: Vec3,
    pub tile_id: String,
    pub payload: String,
}

/// The run finished. Written once per run.
#[derive(Message, Debug, Clone)]
pub struct MapGenerated {
    pub summary: RunSummary,
}

/// Clear spawned tiles and start over.
#[derive(Message, Debug, Clone, Default)]
pub struct RegenerateMap {
    /// Seed for the new run. `None` falls back to the configured seed.
    pub seed: Option<u64>,
}

/// Marker for entities spawned from `TilePlaced`, despawned on regeneration.
#[derive(Component, Debug, Clone, Copy)]
pub struct GeneratedTile {
    pub pos: IVec3,
}

/// Snapshot of the scheduler for UIs and tests.
#[derive(Resource, Debug, Clone, Default)]
pub struct GenerationStatus {
    pub state: GenerationState,
    pub steps: usize,
    pub placed: usize,
    pub contradictions: usize,
    pub completions: usize,
    pub seed: Option<u64>,
}

fn handle_regenerate(
    mut commands: Commands,
    mut requests: MessageReader<RegenerateMap>,
    mut generator: ResMut<TileMapGenerator>,
    mut playback: ResMut<PlaybackState>,
    mut status: ResMut<GenerationStatus>,
    spawned: Query<Entity, With<GeneratedTile>>,
) {
    // Several requests in one frame collapse into the last one
    let Some(request) = requests.read().last().cloned() else {
        return;
    };

    for entity in &spawned {
        commands.entity(entity).despawn();
    }

    let seed = request.seed.or(generator.scheduler.config().seed);
    generator.scheduler.start_with_seed(seed);
    playback.reset();
    playback.play();
    status.placed = 0;
}

fn drive_generator(
    mut generator: ResMut<TileMapGenerator>,
    mut playback: ResMut<PlaybackState>,
    mut status: ResMut<GenerationStatus>,
    mut placed: MessageWriter<TilePlaced>,
    mut generated: MessageWriter<MapGenerated>,
) {
    let scheduler = &mut generator.scheduler;
    let steps = playback.steps_this_frame(scheduler.config().steps_per_frame);

    for _ in 0..steps {
        if !scheduler.state().is_running() {
            break;
        }
        let report = scheduler.step();

        let tile_size = scheduler.config().tile_size;
        let parent = scheduler.config().parent;
        for placement in report.placements {
            let variant = scheduler.catalog().variant(placement.tile);
            placed.write(TilePlaced {
                placement,
                world_position: placement.world_position(tile_size, &parent),
                tile_id: variant.id.clone(),
                payload: variant.payload.clone(),
            });
            status.placed += 1;
        }

        if report.completed {
            if let Some(summary) = scheduler.summary() {
                generated.write(MapGenerated { summary });
            }
            playback.mark_completed();
        }
    }

    status.state = scheduler.state();
    status.steps = scheduler.steps();
    status.contradictions = scheduler.contradictions().map_or(0, |log| log.len());
    status.completions = scheduler.completions();
    status.seed = scheduler.seed();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wfc::catalog::tests::straight_and_empty;

    fn test_app(config: GeneratorConfig) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(MapGenPlugin {
                catalog: Arc::new(straight_and_empty()),
                config,
            });
        app
    }

    fn drain<M: Message + Clone>(app: &mut App) -> Vec<M> {
        app.world_mut()
            .resource_mut::<Messages<M>>()
            .drain()
            .collect()
    }

    #[test]
    fn test_generates_map_over_frames() {
        let mut app = test_app(GeneratorConfig::default().with_size(3, 3).with_seed(5));

        let mut placed = Vec::new();
        let mut generated = Vec::new();
        for _ in 0..20 {
            app.update();
            placed.extend(drain::<TilePlaced>(&mut app));
            generated.extend(drain::<MapGenerated>(&mut app));
        }

        assert_eq!(placed.len(), 9 + 16);
        assert_eq!(generated.len(), 1);
        let status = app.world().resource::<GenerationStatus>();
        assert_eq!(status.state, GenerationState::Complete);
        assert_eq!(status.completions, 1);
        assert!(app.world().resource::<PlaybackState>().completed);

        let corner = placed
            .iter()
            .find(|p| p.placement.pos == IVec3::new(2, 0, 2))
            .unwrap();
        assert_eq!(corner.world_position, Vec3::new(4.0, 0.0, 4.0));
        assert_eq!(corner.tile_id, "Empty");
        assert_eq!(corner.payload, "prefabs/empty");
    }

    #[test]
    fn test_no_autostart_stays_idle() {
        let mut config = GeneratorConfig::default().with_seed(1);
        config.autostart = false;
        let mut app = test_app(config);
        for _ in 0..5 {
            app.update();
        }
        assert!(drain::<TilePlaced>(&mut app).is_empty());
        assert_eq!(
            app.world().resource::<GenerationStatus>().state,
            GenerationState::Idle
        );
    }

    #[test]
    fn test_invalid_grid_leaves_app_running() {
        let mut app = test_app(GeneratorConfig::default().with_size(0, 4));
        for _ in 0..3 {
            app.update();
        }
        assert!(app.world().get_resource::<TileMapGenerator>().is_none());
        assert!(!app.world().resource::<PlaybackState>().playing);
        assert_eq!(
            app.world().resource::<GenerationStatus>().state,
            GenerationState::Idle
        );
        assert!(drain::<TilePlaced>(&mut app).is_empty());
    }

    #[test]
    fn test_regenerate_clears_tiles_and_restarts() {
        let mut app = test_app(GeneratorConfig::default().with_size(3, 3).with_seed(5));
        for _ in 0..20 {
            app.update();
        }
        let tile = app
            .world_mut()
            .spawn(GeneratedTile { pos: IVec3::ZERO })
            .id();

        app.world_mut().write_message(RegenerateMap { seed: Some(77) });
        app.update();

        assert!(app.world().get_entity(tile).is_err());
        let status = app.world().resource::<GenerationStatus>();
        assert_eq!(status.seed, Some(77));

        for _ in 0..20 {
            app.update();
        }
        assert_eq!(app.world().resource::<GenerationStatus>().completions, 2);
    }
}
