//! Hot reload of the tile catalog file.
//!
//! Watches the catalog's directory and, when the file changes, reloads it,
//! swaps it into the running generator and requests a fresh map. A catalog
//! that fails to load is reported and the previous one stays in use.

use crate::catalog_io::load_catalog;
use crate::plugin::{MapGenSet, RegenerateMap, TileMapGenerator};
use bevy::prelude::*;
use notify::{recommended_watcher, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

/// Reloads the catalog at `path` whenever it changes on disk.
pub struct CatalogReloadPlugin {
    pub path: PathBuf,
    /// Watch the file system. Without it, reloads only happen through
    /// `CatalogReloadFlag`.
    pub watch: bool,
}

impl CatalogReloadPlugin {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            watch: true,
        }
    }

    pub fn without_watcher(mut self) -> Self {
        self.watch = false;
        self
    }
}

impl Plugin for CatalogReloadPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(CatalogSource {
            path: self.path.clone(),
        })
        .insert_resource(CatalogReloadFlag::default())
        .add_systems(
            Update,
            (check_catalog_changes, reload_catalog)
                .chain()
                .before(MapGenSet),
        );
        if self.watch {
            app.add_systems(Startup, setup_catalog_watcher);
        }
    }
}

/// File the catalog was loaded from.
#[derive(Resource, Debug, Clone)]
pub struct CatalogSource {
    pub path: PathBuf,
}

/// Set to true to reload the catalog on the next frame.
#[derive(Resource, Debug, Default)]
pub struct CatalogReloadFlag {
    pub needs_reload: bool,
}

/// File watcher (non-send because of the mpsc receiver).
struct CatalogWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<Result<Event, notify::Error>>,
}

fn setup_catalog_watcher(world: &mut World) {
    let path = world.resource::<CatalogSource>().path.clone();
    let watch_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let (tx, rx) = channel();
    let mut watcher = match recommended_watcher(move |res| {
        let _ = tx.send(res);
    }) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create catalog watcher: {:?}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&watch_dir, RecursiveMode::NonRecursive) {
        error!("Failed to watch {:?}: {:?}", watch_dir, e);
        return;
    }

    info!("Hot reload enabled for {}", path.display());
    world.insert_non_send_resource(CatalogWatcher {
        _watcher: watcher,
        receiver: rx,
    });
}

fn check_catalog_changes(
    watcher: Option<NonSend<CatalogWatcher>>,
    source: Res<CatalogSource>,
    mut flag: ResMut<CatalogReloadFlag>,
) {
    let Some(watcher) = watcher else { return };
    let file_name = source.path.file_name();

    while let Ok(event) = watcher.receiver.try_recv() {
        let Ok(event) = event else { continue };
        if event.paths.iter().any(|p| p.file_name() == file_name) {
            info!("Detected change in {}, scheduling reload", source.path.display());
            flag.needs_reload = true;
        }
    }
}

fn reload_catalog(
    source: Res<CatalogSource>,
    mut flag: ResMut<CatalogReloadFlag>,
    generator: Option<ResMut<TileMapGenerator>>,
    mut regenerate: MessageWriter<RegenerateMap>,
) {
    if !flag.needs_reload {
        return;
    }
    flag.needs_reload = false;
    let Some(mut generator) = generator else { return };

    let catalog = match load_catalog(&source.path) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to reload {}: {}", source.path.display(), e);
            return;
        }
    };

    match generator.scheduler.set_catalog(Arc::new(catalog)) {
        Ok(()) => {
            regenerate.write(RegenerateMap::default());
        }
        Err(e) => error!("Reloaded catalog rejected: {}", e),
    }
}
