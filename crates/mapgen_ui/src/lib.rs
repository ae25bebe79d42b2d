use bevy::prelude::*;
use bevy_mod_imgui::prelude::*;
use mapgen_core::{GenerationStatus, PlaybackState, RegenerateMap, TileMapGenerator};
use rand::Rng;

pub struct MapGenUiPlugin;

impl Plugin for MapGenUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(bevy_mod_imgui::ImguiPlugin::default())
            .add_systems(Update, imgui_ui);
    }
}

fn imgui_ui(
    mut context: NonSendMut<ImguiContext>,
    status: Res<GenerationStatus>,
    generator: Option<Res<TileMapGenerator>>,
    mut playback: ResMut<PlaybackState>,
    mut regenerate: MessageWriter<RegenerateMap>,
) {
    let ui = context.ui();

    // Enable docking
    ui.dockspace_over_main_viewport();

    ui.window("Map Generator")
        .size([320.0, 220.0], Condition::FirstUseEver)
        .build(|| {
            ui.text(format!("State: {:?}", status.state));
            ui.text(format!("Steps: {}", status.steps));
            ui.text(format!("Tiles placed: {}", status.placed));
            ui.text(format!("Contradictions: {}", status.contradictions));
            match status.seed {
                Some(seed) => ui.text(format!("Seed: {}", seed)),
                None => ui.text("Seed: -"),
            }
            if let Some(generator) = &generator {
                ui.text(format!(
                    "Catalog: {} tiles",
                    generator.scheduler.catalog().len()
                ));
            }
            ui.separator();

            let play_label = if playback.playing { "Pause" } else { "Play" };
            if ui.button(play_label) {
                playback.toggle_play();
            }

            ui.same_line();

            if ui.button("Step") {
                playback.pause();
                playback.request_step();
            }

            if ui.button("Regenerate") {
                regenerate.write(RegenerateMap::default());
            }

            ui.same_line();

            if ui.button("New Seed") {
                let seed = rand::thread_rng().gen::<u64>();
                regenerate.write(RegenerateMap { seed: Some(seed) });
            }
        });
}
