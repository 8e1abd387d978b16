mod common;

use aquarium_core::FixedRng;
use aquarium_data::{ReproPhase, Sex, WorldEventKind};
use common::{run_for, WorldBuilder};

fn lay_in_place(rng_value: f64) -> aquarium_core::World {
    let mut world = WorldBuilder::new()
        .with_seed(4)
        .with_fish_count(1)
        .with_fixed_rng(rng_value)
        .build();
    let here = world.fish[0].position;
    let fish = &mut world.fish[0];
    fish.sex = Sex::Female;
    fish.repro.state = ReproPhase::Laying;
    fish.repro.lay_target = Some(here);
    world.update(0.05);
    world
}

#[test]
fn test_clutch_size_spans_species_range() {
    let small = lay_in_place(0.0);
    assert_eq!(small.eggs.len(), 2);
    assert_eq!(small.eggs_laid_count, 2);

    let large = lay_in_place(0.999);
    assert_eq!(large.eggs.len(), 4);
    assert_eq!(large.fish[0].repro.state, ReproPhase::Cooldown);
}

#[test]
fn test_clutch_emits_event() {
    let mut world = WorldBuilder::new().with_seed(4).with_fish_count(1).build();
    let here = world.fish[0].position;
    world.fish[0].sex = Sex::Female;
    world.fish[0].repro.state = ReproPhase::Laying;
    world.fish[0].repro.lay_target = Some(here);
    world.set_rng(Box::new(FixedRng::new(0.0)));
    let events = world.update(0.05);
    assert!(events
        .iter()
        .any(|e| matches!(e.kind, WorldEventKind::ClutchLaid { .. })));
}

#[test]
fn test_speed_cap_unlocks_with_sim_time() {
    let mut world = WorldBuilder::new().build();
    assert_eq!(world.available_speed_cap(), 1.0);
    assert_eq!(world.set_speed_multiplier(3.0), 1.0);

    world.sim_time_sec = 30.0 * 60.0;
    assert_eq!(world.set_speed_multiplier(3.0), 2.0);

    world.sim_time_sec = 120.0 * 60.0;
    assert_eq!(world.set_speed_multiplier(3.0), 3.0);
    let before = world.sim_time_sec;
    world.update(0.1);
    assert!((world.sim_time_sec - before - 0.3).abs() < 1e-9);
}

#[test]
fn test_dev_mode_lifts_speed_cap() {
    let mut world = WorldBuilder::new()
        .with_config(|config| config.world.dev_mode = true)
        .build();
    assert_eq!(world.set_speed_multiplier(20.0), 16.0);
}

#[test]
fn test_higher_filter_tier_keeps_water_cleaner() {
    let tuned = |tier: u8| {
        let mut world = WorldBuilder::new().with_seed(11).with_fish_count(4).build();
        world.water.filter_installed = true;
        world.water.filter_enabled = true;
        world.water.filter01 = 1.0;
        world.water.filter_tier = tier;
        world.water.dirt01 = 0.5;
        world.water.hygiene01 = 0.6;
        world
    };
    let mut low = tuned(1);
    let mut high = tuned(2);
    run_for(&mut low, 120.0, 0.25);
    run_for(&mut high, 120.0, 0.25);
    assert!(high.water.dirt01 < low.water.dirt01);
}

#[test]
fn test_non_positive_delta_changes_nothing() {
    let mut world = WorldBuilder::new().with_seed(9).build();
    world.update(0.25);
    let before = serde_json::to_value(world.to_state()).unwrap();
    for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(world.update(dt).is_empty());
    }
    let after = serde_json::to_value(world.to_state()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_same_seed_same_history() {
    let run = || {
        let mut world = WorldBuilder::new().with_seed(77).with_fish_count(6).build();
        world.spawn_food(300.0, 20.0, None, None);
        run_for(&mut world, 30.0, 0.25);
        serde_json::to_value(world.to_state()).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_starved_tank_fails_once() {
    let mut world = WorldBuilder::new().with_seed(3).with_fish_count(2).build();
    for fish in &mut world.fish {
        fish.energy01 = 0.0;
        fish.hunger01 = 1.0;
        fish.last_distance_moved = 1.0;
    }
    let mut died = 0;
    for _ in 0..8 {
        died += world
            .update(0.25)
            .iter()
            .filter(|e| matches!(e.kind, WorldEventKind::Died { .. }))
            .count();
    }
    assert_eq!(died, 2);
    assert_eq!(world.deaths_count, 2);
    assert!(world.is_ecosystem_failed());
}

#[test]
fn test_fed_fish_schedules_poop() {
    let mut world = WorldBuilder::new().with_seed(5).with_fish_count(1).build();
    for _ in 0..2 {
        world.fish[0].energy01 = 0.3;
        world.fish[0].hunger01 = 0.7;
        let at = world.fish[0].position;
        world.spawn_food(at.x, at.y, None, None);
        world.update(0.05);
    }
    assert_eq!(world.fish[0].history.meals_eaten, 2);
    assert_eq!(world.scheduled_poop().len(), 1);
}
