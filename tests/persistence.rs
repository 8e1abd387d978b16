mod common;

use aquarium_data::{Bounds, SAVE_VERSION};
use aquarium_io::SaveStore;
use common::{run_for, WorldBuilder};
use serde_json::json;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_save_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = SaveStore::new(dir.path().join("aquarium.json"));

    let mut original = WorldBuilder::new().with_seed(21).with_fish_count(5).build();
    original.spawn_food(200.0, 30.0, None, None);
    run_for(&mut original, 20.0, 0.25);
    store.save(&original).unwrap();

    let mut restored = WorldBuilder::new().with_seed(1).with_fish_count(1).build();
    assert!(store.restore_into(&mut restored).unwrap());

    let (a, b) = (original.to_state(), restored.to_state());
    assert!(close(a.sim_time_sec, b.sim_time_sec));
    assert!(close(a.water.hygiene01, b.water.hygiene01));
    assert!(close(a.water.dirt01, b.water.dirt01));
    assert_eq!(a.food.len(), b.food.len());
    assert_eq!(a.eggs.len(), b.eggs.len());
    assert_eq!(a.births_count, b.births_count);
    assert_eq!(a.peak_population_count, b.peak_population_count);
    assert_eq!(a.fish.len(), b.fish.len());
    for (before, after) in a.fish.iter().zip(&b.fish) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.name, after.name);
        assert_eq!(before.life_stage, after.life_stage);
        assert!(before.position.distance_to(after.position) < 1e-6);
        assert!(close(before.energy01, after.energy01));
    }
}

#[test]
fn test_restore_resizes_to_saved_tank() {
    let dir = tempfile::tempdir().unwrap();
    let store = SaveStore::new(dir.path().join("aquarium.json"));
    let mut original = WorldBuilder::new().with_seed(2).build();
    original.resize(900.0, 500.0);
    store.save(&original).unwrap();

    let mut restored = WorldBuilder::new().with_seed(2).build();
    assert!(store.restore_into(&mut restored).unwrap());
    assert_eq!(restored.bounds, Bounds::new(900.0, 500.0));
}

#[test]
fn test_corrupted_state_loads_with_repairs() {
    let mut world = WorldBuilder::new().with_seed(8).build();
    let mut state = serde_json::to_value(world.to_state()).unwrap();
    let width = world.bounds.width;

    state["fish"][0]["position"] = json!({ "x": width * 10.0, "y": -500.0 });
    state["fish"][0]["lifeStage"] = json!("TADPOLE");
    state["food"] = json!(null);
    state["poop"] = json!("not a list");
    state["water"]["hygiene01"] = json!(7.5);
    state["simTimeSec"] = json!(-3.0);

    let envelope = json!({
        "saveVersion": SAVE_VERSION,
        "savedAtEpochMs": 0,
        "boundsWidth": world.bounds.width,
        "boundsHeight": world.bounds.height,
        "worldState": state,
    });
    assert!(world.load_from_json(&envelope));

    let fish = &world.fish[0];
    assert!(fish.position.x <= world.bounds.width);
    assert!(fish.position.y >= 0.0);
    assert!(world.food.is_empty());
    assert!(world.poop.is_empty());
    assert!((0.0..=1.0).contains(&world.water.hygiene01));
    assert!(world.sim_time_sec >= 0.0);

    // The repaired world keeps ticking.
    run_for(&mut world, 5.0, 0.25);
}

#[test]
fn test_null_collections_load_empty() {
    let mut world = WorldBuilder::new().with_seed(8).build();
    let mut state = serde_json::to_value(world.to_state()).unwrap();
    state["fish"] = json!(null);
    state["eggs"] = json!(null);
    state["food"] = json!(null);
    assert!(world.load_from_json(&state));
    assert!(world.fish.is_empty());
    assert!(world.eggs.is_empty());
    assert!(world.food.is_empty());
}

#[test]
fn test_foreign_version_leaves_world_untouched() {
    let mut world = WorldBuilder::new().with_seed(8).build();
    let before = serde_json::to_value(world.to_state()).unwrap();
    let envelope = json!({ "saveVersion": SAVE_VERSION + 1, "worldState": {} });
    assert!(!world.load_from_json(&envelope));
    assert_eq!(serde_json::to_value(world.to_state()).unwrap(), before);
}
