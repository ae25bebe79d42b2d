use bevy::prelude::*;
use mapgen_core::{
    load_catalog, CatalogError, CatalogReloadPlugin, Direction, GeneratedTile, GeneratorConfig,
    MapGenPlugin, MapGenSet, MapGenerated, SocketLabel, TileMapGenerator, TilePlaced,
};
use mapgen_ui::MapGenUiPlugin;
use std::collections::HashMap;

const CATALOG_PATH: &str = "assets/tiles/town.lua";

fn main() -> Result<(), CatalogError> {
    let catalog = load_catalog(CATALOG_PATH)?;
    let config = GeneratorConfig::default().with_size(10, 10);
    let center = Vec3::new(
        config.size_x as f32 * config.tile_size * 0.5,
        0.0,
        config.size_z as f32 * config.tile_size * 0.5,
    );

    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(MapGenPlugin::new(catalog, config))
        .add_plugins(CatalogReloadPlugin::new(CATALOG_PATH))
        .add_plugins(MapGenUiPlugin)
        // Dark background
        .insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.08)))
        .insert_resource(MapCenter(center))
        .init_resource::<TileAssets>()
        .add_systems(Startup, setup)
        .add_systems(Update, (spawn_placed_tiles, log_generated).after(MapGenSet))
        .run();

    Ok(())
}

#[derive(Resource)]
struct MapCenter(Vec3);

/// Meshes and materials shared by every spawned tile.
#[derive(Resource, Default)]
struct TileAssets {
    base: Handle<Mesh>,
    connector: Handle<Mesh>,
    connector_material: Handle<StandardMaterial>,
    /// Keyed by payload and border flag.
    materials: HashMap<(String, bool), Handle<StandardMaterial>>,
}

fn setup(
    mut commands: Commands,
    center: Res<MapCenter>,
    mut assets: ResMut<TileAssets>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(center.0 + Vec3::new(-14.0, 22.0, -14.0))
            .looking_at(center.0, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(6.0, 18.0, 4.0).looking_at(center.0, Vec3::Y),
    ));

    assets.base = meshes.add(Cuboid::new(1.9, 0.2, 1.9));
    assets.connector = meshes.add(Cuboid::new(0.5, 0.06, 1.0));
    assets.connector_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.2, 0.22),
        perceptual_roughness: 0.9,
        ..default()
    });
}

/// Payloads in the demo catalog are hex colours.
fn payload_color(payload: &str) -> Color {
    Srgba::hex(payload)
        .map(Color::from)
        .unwrap_or(Color::srgb(0.5, 0.5, 0.5))
}

fn spawn_placed_tiles(
    mut commands: Commands,
    mut placed: MessageReader<TilePlaced>,
    generator: Option<Res<TileMapGenerator>>,
    mut assets: ResMut<TileAssets>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(generator) = generator else {
        return;
    };
    let catalog = generator.scheduler.catalog();
    let half_tile = generator.scheduler.config().tile_size * 0.5;

    for message in placed.read() {
        let material = assets
            .materials
            .entry((message.payload.clone(), message.placement.border))
            .or_insert_with(|| {
                let mut color = payload_color(&message.payload);
                if message.placement.border {
                    color = color.darker(0.15);
                }
                materials.add(StandardMaterial {
                    base_color: color,
                    perceptual_roughness: 0.8,
                    ..default()
                })
            })
            .clone();

        let variant = catalog.variant(message.placement.tile);
        commands
            .spawn((
                Mesh3d(assets.base.clone()),
                MeshMaterial3d(material),
                Transform::from_translation(message.world_position),
                GeneratedTile {
                    pos: message.placement.pos,
                },
            ))
            .with_children(|tile| {
                // Draw a strip toward every connected horizontal face
                for dir in [
                    Direction::North,
                    Direction::South,
                    Direction::East,
                    Direction::West,
                ] {
                    if let SocketLabel::Named(_) = variant.socket(dir) {
                        let offset = dir.offset().as_vec3() * half_tile * 0.5;
                        let rotation = if offset.x != 0.0 {
                            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)
                        } else {
                            Quat::IDENTITY
                        };
                        tile.spawn((
                            Mesh3d(assets.connector.clone()),
                            MeshMaterial3d(assets.connector_material.clone()),
                            Transform::from_translation(offset + Vec3::Y * 0.12)
                                .with_rotation(rotation),
                        ));
                    }
                }
            });
    }
}

fn log_generated(mut generated: MessageReader<MapGenerated>) {
    for message in generated.read() {
        let summary = message.summary;
        info!(
            "Map ready (seed {}): {} tiles, {} gaps, {} contradictions",
            summary.seed, summary.collapsed, summary.gaps, summary.contradictions
        );
    }
}
