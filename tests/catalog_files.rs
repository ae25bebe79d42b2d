//! The shipped catalogs load and generate.

use mapgen_core::{load_catalog, GenerationScheduler, GenerationState, GeneratorConfig};
use std::sync::Arc;

#[test]
fn town_catalog_loads_clean() {
    let catalog = load_catalog("assets/tiles/town.lua").expect("town.lua should load");
    assert_eq!(catalog.border(), catalog.index_of("Grass"));
    assert!(catalog.audit().is_empty(), "{:?}", catalog.audit());

    let gate = catalog.index_of("GateN").unwrap();
    let road = catalog.index_of("RoadNS").unwrap();
    assert!(catalog.allows(gate, mapgen_core::Direction::North, road));
}

#[test]
fn path_catalog_matches_lua_shape() {
    let catalog = load_catalog("assets/tiles/path.json").expect("path.json should load");
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.border(), catalog.index_of("Empty"));
}

#[test]
fn town_generates_for_many_seeds() {
    let catalog = Arc::new(load_catalog("assets/tiles/town.lua").unwrap());
    for seed in 0..15 {
        let config = GeneratorConfig::default().with_size(10, 10).with_seed(seed);
        let mut scheduler = GenerationScheduler::new(catalog.clone(), config).unwrap();
        scheduler.start();
        let report = scheduler.run_to_completion();

        assert_eq!(scheduler.state(), GenerationState::Complete);
        assert!(report.completed);
        let summary = scheduler.summary().unwrap();
        assert_eq!(summary.collapsed + summary.gaps, 100);
        assert_eq!(report.placements.iter().filter(|p| p.border).count(), 44);
    }
}
