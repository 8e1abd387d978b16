//! Save and load.
//!
//! Loading never fails halfway. Each entity is decoded against a template
//! of defaults: fields that are missing, `null` or of the wrong shape keep
//! the template value, then every number is clamped back into range.

use super::fixtures::{reed_branches, sanitize_reed};
use super::{NextIds, SpeciesUnlocks, World};
use crate::config::AppConfig;
use crate::fish::lifecycle::update_life_cycle;
use crate::fish::metabolism::hunger_state_for;
use crate::fish::{FishLogic, SpawnParams};
use crate::geometry::clamp01;
use crate::rng::FixedRng;
use aquarium_data::{
    Behavior, BerryReedPlant, Bounds, Egg, EggState, Fish, Food, Fruit, HungerState, Nestbrush,
    PlayState, Poop, ReproPhase, ReproState, SaveEnvelope, Sex, SpeciesId, Traits, Vec2,
    WaterState, WorldState, SAVE_VERSION,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Overlays `incoming` on `template`, keeping the template wherever the
/// incoming value is absent, `null` or of a different JSON kind.
fn merge_value(template: &Value, incoming: &Value) -> Value {
    match (template, incoming) {
        (_, Value::Null) => template.clone(),
        (Value::Null, _) => incoming.clone(),
        (Value::Object(base), Value::Object(over)) => {
            let mut out = base.clone();
            for (key, base_value) in base {
                if let Some(over_value) = over.get(key) {
                    out.insert(key.clone(), merge_value(base_value, over_value));
                }
            }
            Value::Object(out)
        }
        (Value::Number(_), Value::Number(_))
        | (Value::String(_), Value::String(_))
        | (Value::Bool(_), Value::Bool(_))
        | (Value::Array(_), Value::Array(_)) => incoming.clone(),
        _ => template.clone(),
    }
}

/// Decodes `incoming` over `template`. Fields that still fail to decode
/// after the merge fall back to the template one at a time. Returns `None`
/// only when `incoming` is not an object.
fn decode_lenient<T: Serialize + DeserializeOwned>(template: &T, incoming: &Value) -> Option<T> {
    if !incoming.is_object() {
        return None;
    }
    let base = serde_json::to_value(template).ok()?;
    let merged = merge_value(&base, incoming);
    if let Ok(decoded) = serde_json::from_value(merged.clone()) {
        return Some(decoded);
    }

    let (Value::Object(base_map), Value::Object(merged_map)) = (&base, &merged) else {
        return serde_json::from_value(base).ok();
    };
    let mut current = base_map.clone();
    for (key, value) in merged_map {
        let previous = current.insert(key.clone(), value.clone());
        if serde_json::from_value::<T>(Value::Object(current.clone())).is_err() {
            match previous {
                Some(previous) => current.insert(key.clone(), previous),
                None => current.remove(key),
            };
        }
    }
    serde_json::from_value(Value::Object(current)).ok()
}

fn entries<'a>(state: &'a Value, key: &str) -> &'a [Value] {
    state
        .get(key)
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

fn number(state: &Value, key: &str, default: f64) -> f64 {
    state
        .get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn counter(state: &Value, key: &str) -> u64 {
    number(state, key, 0.0).max(0.0).floor() as u64
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn template_fish(bounds: Bounds, config: &AppConfig) -> Fish {
    let params = SpawnParams {
        id: 0,
        name: String::new(),
        species_id: SpeciesId::LabMinnow,
        sex: Sex::Female,
        position: Vec2::new(bounds.width * 0.5, bounds.swim_height() * 0.5),
        spawn_time_sec: 0.0,
        now_sec: 0.0,
        traits: Traits::default(),
        stage_shift_baby_sec: 0.0,
        stage_shift_juvenile_sec: 0.0,
        hunger01: 0.0,
        mother_id: None,
        father_id: None,
        born_in_aquarium: false,
    };
    Fish::spawn(params, bounds, config, &mut FixedRng::new(0.5))
}

fn template_egg() -> Egg {
    Egg {
        id: 0,
        x: 0.0,
        y: 0.0,
        laid_at_sec: 0.0,
        hatch_at_sec: 0.0,
        mother_id: None,
        father_id: None,
        mother_traits: Traits::default(),
        father_traits: Traits::default(),
        species_id: SpeciesId::LabMinnow,
        state: EggState::Incubating,
        can_be_eaten: true,
        nutrition: 0.25,
        is_protected_by_nestbrush: false,
        nestbrush_attachment: None,
    }
}

fn template_food(config: &AppConfig) -> Food {
    Food {
        id: 0,
        x: 0.0,
        y: 0.0,
        amount: config.food.default_amount,
        ttl: config.food.default_ttl_sec,
        vy: config.food.initial_fall_speed[0],
    }
}

fn template_poop(config: &AppConfig) -> Poop {
    Poop {
        id: 0,
        x: 0.0,
        y: 0.0,
        ttl_sec: config.poop.default_ttl_sec,
        max_ttl_sec: config.poop.default_ttl_sec,
        vx: 0.0,
        vy: config.poop.drift_speed,
        can_be_eaten: true,
        nutrition: config.poop.nutrition,
        bioload_factor: 1.0,
    }
}

fn template_reed(bounds: Bounds) -> BerryReedPlant {
    let h = bounds.swim_height();
    BerryReedPlant {
        id: 0,
        x: bounds.width * 0.5,
        bottom_y: h,
        height: h * 0.15,
        spawn_height: h * 0.15,
        max_height: h * 0.24,
        sway_phase: 0.0,
        sway_rate: 0.0012,
        branches: Vec::new(),
        next_fruit_at_sec: None,
        growth_elapsed_sec: 0.0,
    }
}

fn template_fruit(config: &AppConfig) -> Fruit {
    Fruit {
        id: 0,
        plant_id: 0,
        branch_index: 0,
        u: 0.9,
        v: 0.0,
        radius: 3.0,
        created_at_sec: 0.0,
        ttl_sec: config.fixtures.reed_fruit_ttl_sec,
    }
}

fn template_nestbrush(bounds: Bounds) -> Nestbrush {
    let h = bounds.swim_height();
    Nestbrush {
        id: 0,
        x: bounds.width * 0.22,
        bottom_y: h,
        height: h * 0.11,
        stage: 1,
        growth_progress_sec: 0.0,
        sway_phase: 0.0,
        sway_rate: 0.001,
    }
}

fn sanitize_water(water: &mut WaterState, max_tier: u8) {
    water.hygiene01 = clamp01(finite_or(water.hygiene01, 1.0));
    water.dirt01 = clamp01(finite_or(water.dirt01, 0.0));
    water.filter01 = clamp01(finite_or(water.filter01, 0.0));
    water.install_progress01 = clamp01(finite_or(water.install_progress01, 0.0));
    water.maintenance_progress01 = clamp01(finite_or(water.maintenance_progress01, 0.0));
    water.upgrade_progress01 = clamp01(finite_or(water.upgrade_progress01, 0.0));
    water.effective_filter01 = clamp01(finite_or(water.effective_filter01, 0.0));
    water.maintenance_cooldown_sec = finite_or(water.maintenance_cooldown_sec, 0.0).max(0.0);
    water.filter_tier = water.filter_tier.min(max_tier);
    if water.filter_installed {
        water.filter_tier = water.filter_tier.max(1);
        water.install_progress01 = 0.0;
    } else {
        water.filter_tier = 0;
        water.filter01 = 0.0;
        water.maintenance_progress01 = 0.0;
        water.upgrade_progress01 = 0.0;
    }
    if water.upgrade_progress01 <= 0.0 || water.upgrade_target_tier <= water.filter_tier {
        water.upgrade_progress01 = 0.0;
        water.upgrade_target_tier = 0;
    } else {
        water.upgrade_target_tier = water.upgrade_target_tier.min(max_tier);
    }
}

fn sanitize_fish(fish: &mut Fish, bounds: Bounds, now: f64, config: &AppConfig) {
    fish.position = bounds.clamp_point(fish.position);
    fish.target = bounds.clamp_point(fish.target);
    fish.spawn_time_sec = finite_or(fish.spawn_time_sec, now).min(now);

    let traits = &mut fish.traits;
    traits.color_hue = finite_or(traits.color_hue, 25.0).rem_euclid(360.0);
    traits.size_factor = finite_or(traits.size_factor, 1.0).clamp(0.1, 3.0);
    traits.growth_rate = finite_or(traits.growth_rate, 1.0).max(0.01);
    traits.lifespan_sec = finite_or(traits.lifespan_sec, config.age.lifespan_mean_sec)
        .max(config.age.min_lifespan_sec);
    traits.speed_factor = finite_or(traits.speed_factor, 0.55).max(0.0);
    let species = config.species.get(fish.species_id);
    fish.adult_radius = config.growth.adult_radius * fish.traits.size_factor * species.adult_size_scale;

    fish.energy01 = clamp01(finite_or(fish.energy01, 1.0));
    fish.hunger01 = 1.0 - fish.energy01;
    fish.wellbeing01 = clamp01(finite_or(fish.wellbeing01, 1.0));
    fish.water_penalty01 = clamp01(finite_or(fish.water_penalty01, 0.0));
    fish.corpse_dirt_applied01 = finite_or(fish.corpse_dirt_applied01, 0.0)
        .clamp(0.0, config.corpse.dirt_max01);
    fish.eat_anim_timer = finite_or(fish.eat_anim_timer, 0.0).max(0.0);
    fish.digest_bites = fish
        .digest_bites
        .min(config.poop.bites_per_poop.saturating_sub(1));
    fish.current_speed = finite_or(fish.current_speed, 0.0).max(0.0);
    fish.facing = if fish.facing < 0 { -1 } else { 1 };
    fish.mating_anim = None;
    fish.hover.anchor = fish.hover.anchor.map(|a| bounds.clamp_point(a));
    fish.play_state = PlayState {
        cooldown_until_sec: finite_or(fish.play_state.cooldown_until_sec, 0.0).max(0.0),
        ..PlayState::default()
    };

    if fish.sex == Sex::Male {
        fish.repro = ReproState {
            cooldown_until_sec: finite_or(fish.repro.cooldown_until_sec, 0.0).max(0.0),
            ..ReproState::default()
        };
    } else {
        let repro = &mut fish.repro;
        repro.lay_target = repro.lay_target.map(|t| bounds.clamp_point(t));
        if repro.state == ReproPhase::Gravid && repro.due_at_sec.is_none() {
            repro.state = ReproPhase::Ready;
            repro.clear_pregnancy();
        }
    }

    if fish.is_alive() {
        update_life_cycle(fish, now, config);
    }
    if fish.is_alive() {
        fish.hunger_state = hunger_state_for(fish.hunger01, config);
        fish.behavior = Behavior::Wander;
    } else {
        fish.energy01 = 0.0;
        fish.hunger01 = 1.0;
        fish.wellbeing01 = 0.0;
        fish.hunger_state = HungerState::Dead;
        fish.dead_at_sec = Some(fish.dead_at_sec.filter(|t| t.is_finite()).unwrap_or(now));
        fish.behavior = Behavior::DeadSink;
    }
}

impl World {
    /// Snapshot of everything that persists. `fishArchive` lists every fish
    /// ever seen, live ones included, ordered by id.
    #[must_use]
    pub fn to_state(&self) -> WorldState {
        WorldState {
            save_version: SAVE_VERSION,
            sim_time_sec: self.sim_time_sec,
            speed_multiplier: self.speed_multiplier,
            initial_fish_count: self.initial_fish_count,
            foods_consumed_count: self.foods_consumed_count,
            food_amount_consumed_total: self.food_amount_consumed_total,
            births_count: self.births_count,
            eggs_laid_count: self.eggs_laid_count,
            deaths_count: self.deaths_count,
            peak_population_count: self.peak_population_count,
            grandparent_ids: self.grandparent_ids.iter().copied().collect(),
            water: self.water.clone(),
            fish: self.fish.clone(),
            fish_archive: self.fish_inspector_list().into_iter().cloned().collect(),
            eggs: self.eggs.clone(),
            food: self.food.clone(),
            poop: self.poop.clone(),
            berry_reed_plants: self.berry_reed_plants.clone(),
            fruits: self.fruits.clone(),
            nestbrush: self.nestbrush.clone(),
        }
    }

    #[must_use]
    pub fn to_envelope(&self, saved_at_epoch_ms: i64) -> SaveEnvelope {
        SaveEnvelope {
            save_version: SAVE_VERSION,
            saved_at_epoch_ms,
            bounds_width: self.bounds.width,
            bounds_height: self.bounds.height,
            world_state: self.to_state(),
        }
    }

    /// Replaces the world with a saved one. Accepts a [`SaveEnvelope`] or a
    /// bare [`WorldState`]. Returns `false`, leaving the world untouched,
    /// when the payload is not an object or carries another save version.
    pub fn load_from_json(&mut self, value: &Value) -> bool {
        let (state, envelope_version) = match value.get("worldState") {
            Some(inner) if inner.is_object() => (inner, Some(value.get("saveVersion"))),
            _ => (value, None),
        };
        if !state.is_object() {
            tracing::warn!("Save payload is not an object");
            return false;
        }
        let expected = u64::from(SAVE_VERSION);
        let inner_version = state.get("saveVersion").and_then(Value::as_u64);
        let outer_version = envelope_version.map(|v| v.and_then(Value::as_u64));
        let version_ok = match (outer_version, inner_version) {
            (Some(outer), Some(inner)) => outer == Some(expected) && inner == expected,
            (Some(outer), None) => outer == Some(expected),
            (None, inner) => inner == Some(expected),
        };
        if !version_ok {
            tracing::warn!(?inner_version, "Save version mismatch, ignoring save");
            return false;
        }

        self.apply_state(state);
        tracing::info!(
            sim_time_sec = self.sim_time_sec,
            fish = self.fish.len(),
            archived = self.archive.len(),
            eggs = self.eggs.len(),
            "World loaded"
        );
        true
    }

    fn apply_state(&mut self, state: &Value) {
        let bounds = self.bounds;
        let config = self.config.clone();
        let now = number(state, "simTimeSec", 0.0).max(0.0);

        self.sim_time_sec = now;
        self.initial_fish_count = (number(state, "initialFishCount", 4.0).round() as u32).clamp(1, 6);
        self.foods_consumed_count = counter(state, "foodsConsumedCount");
        self.food_amount_consumed_total = number(state, "foodAmountConsumedTotal", 0.0).max(0.0);
        self.births_count = counter(state, "birthsCount");
        self.eggs_laid_count = counter(state, "eggsLaidCount");
        self.deaths_count = counter(state, "deathsCount");
        self.peak_population_count = counter(state, "peakPopulationCount");
        self.grandparent_ids = entries(state, "grandparentIds")
            .iter()
            .filter_map(Value::as_u64)
            .collect();

        let mut water = state
            .get("water")
            .and_then(|w| decode_lenient(&WaterState::default(), w))
            .unwrap_or_default();
        sanitize_water(&mut water, config.water.max_tier);
        self.water = water;

        let fish_template = template_fish(bounds, &config);
        let mut seen = HashSet::new();
        let mut needs_id = Vec::new();
        let mut live = Vec::new();
        for raw in entries(state, "fish") {
            let Some(mut fish) = decode_lenient(&fish_template, raw) else {
                continue;
            };
            sanitize_fish(&mut fish, bounds, now, &config);
            if fish.id == 0 || !seen.insert(fish.id) {
                needs_id.push(live.len());
            }
            live.push(fish);
        }
        let mut archive = BTreeMap::new();
        for raw in entries(state, "fishArchive") {
            let Some(mut fish) = decode_lenient(&fish_template, raw) else {
                continue;
            };
            if fish.id == 0 || !seen.insert(fish.id) {
                continue;
            }
            sanitize_fish(&mut fish, bounds, now, &config);
            fish.corpse_removed = fish.corpse_removed || !fish.is_alive();
            archive.insert(fish.id, fish);
        }
        let mut next_fish_id = seen.iter().copied().max().unwrap_or(0) + 1;
        for index in needs_id {
            live[index].id = next_fish_id;
            next_fish_id += 1;
        }
        self.fish = live;
        self.archive = archive;

        self.nestbrush = state
            .get("nestbrush")
            .and_then(|n| decode_lenient(&template_nestbrush(bounds), n))
            .map(|mut brush| {
                let h = bounds.swim_height();
                brush.stage = brush.stage.clamp(1, config.fixtures.nestbrush_max_stage.max(1));
                brush.x = finite_or(brush.x, bounds.width * 0.22).clamp(0.0, bounds.width.max(0.0));
                brush.bottom_y = finite_or(brush.bottom_y, h).clamp(0.0, h);
                brush.height = finite_or(brush.height, h * 0.11).clamp(h * 0.05, h * 0.3);
                brush.growth_progress_sec = finite_or(brush.growth_progress_sec, 0.0).max(0.0);
                brush
            });

        let max_growth = config.fixtures.reed_max_growth_sec();
        let mut plants: Vec<BerryReedPlant> = entries(state, "berryReedPlants")
            .iter()
            .filter_map(|raw| decode_lenient(&template_reed(bounds), raw))
            .take(config.fixtures.reed_max_count)
            .collect();
        for plant in &mut plants {
            if plant.branches.is_empty() {
                plant.branches = reed_branches(&mut *self.rng);
            }
            sanitize_reed(plant, bounds, max_growth);
        }
        self.berry_reed_plants = plants;

        let plants = &self.berry_reed_plants;
        self.fruits = entries(state, "fruits")
            .iter()
            .filter_map(|raw| decode_lenient(&template_fruit(&config), raw))
            .filter(|fruit| {
                plants
                    .iter()
                    .any(|p| p.id == fruit.plant_id && fruit.branch_index < p.branches.len())
            })
            .take(config.fixtures.reed_max_fruits)
            .map(|mut fruit| {
                fruit.u = clamp01(finite_or(fruit.u, 0.9));
                fruit.v = finite_or(fruit.v, 0.0);
                fruit.radius = finite_or(fruit.radius, 3.0).max(0.5);
                fruit.ttl_sec = finite_or(fruit.ttl_sec, 0.0).max(0.0);
                fruit
            })
            .collect();

        let has_nest = self.nestbrush.is_some();
        let mut eggs: Vec<Egg> = entries(state, "eggs")
            .iter()
            .filter_map(|raw| decode_lenient(&template_egg(), raw))
            .filter(|egg| egg.state == EggState::Incubating)
            .collect();
        for egg in &mut eggs {
            let p = bounds.clamp_point(Vec2::new(egg.x, egg.y));
            egg.x = p.x;
            egg.y = p.y;
            egg.hatch_at_sec = finite_or(egg.hatch_at_sec, now);
            egg.nutrition = finite_or(egg.nutrition, 0.25).max(0.0);
            if !has_nest {
                egg.is_protected_by_nestbrush = false;
                egg.nestbrush_attachment = None;
            }
            if egg.is_protected_by_nestbrush {
                egg.can_be_eaten = false;
            }
        }
        self.eggs = eggs;

        self.food = entries(state, "food")
            .iter()
            .filter_map(|raw| decode_lenient(&template_food(&config), raw))
            .filter(|food| food.amount > 0.0)
            .map(|mut food| {
                let p = bounds.clamp_point(Vec2::new(food.x, food.y));
                food.x = p.x;
                food.y = p.y;
                food.ttl = finite_or(food.ttl, 0.0).max(0.0);
                food.vy = finite_or(food.vy, 0.0);
                food
            })
            .collect();

        self.poop = entries(state, "poop")
            .iter()
            .filter_map(|raw| decode_lenient(&template_poop(&config), raw))
            .map(|mut poop| {
                let p = bounds.clamp_point(Vec2::new(poop.x, poop.y));
                poop.x = p.x;
                poop.y = p.y;
                poop.ttl_sec = finite_or(poop.ttl_sec, 0.0).max(0.0);
                poop.max_ttl_sec = finite_or(poop.max_ttl_sec, 1.0).max(1.0);
                poop.nutrition = finite_or(poop.nutrition, 0.0).max(0.0);
                poop.bioload_factor = finite_or(poop.bioload_factor, 1.0).max(0.0);
                poop
            })
            .collect();

        self.next_ids = NextIds {
            fish: next_fish_id,
            food: self.food.iter().map(|f| f.id).max().unwrap_or(0) + 1,
            poop: self.poop.iter().map(|p| p.id).max().unwrap_or(0) + 1,
            egg: self.eggs.iter().map(|e| e.id).max().unwrap_or(0) + 1,
            play_session: 1,
            reed: self.berry_reed_plants.iter().map(|p| p.id).max().unwrap_or(0) + 1,
            fruit: self.fruits.iter().map(|f| f.id).max().unwrap_or(0) + 1,
            nestbrush: self.nestbrush.as_ref().map_or(0, |n| n.id) + 1,
        };

        self.mate_pair_next_try_at.clear();
        self.scheduled_poop.clear();
        self.play_sessions.clear();
        self.events.clear();
        self.fx_particles.clear();
        self.expired_food_since_water_update = 0;
        self.pending_poop_dirt01 = 0.0;
        self.rebuild_name_counts();

        self.filter_unlocked = false;
        self.filter_unlocked = self.water.filter_unlocked || self.is_filter_unlocked();
        self.water.filter_unlocked = self.filter_unlocked;
        self.species_unlocks = SpeciesUnlocks::default();
        self.refresh_species_unlocks();

        let speed = number(state, "speedMultiplier", 1.0);
        self.speed_multiplier = 1.0;
        self.set_speed_multiplier(speed);
        self.peak_population_count = self.peak_population_count.max(self.fish.len() as u64);
    }
}
