use super::lifecycle::mark_dead;
use crate::config::AppConfig;
use crate::geometry::clamp01;
use aquarium_data::{DeathReason, Fish, HungerState};

#[must_use]
pub fn hunger_state_for(hunger01: f64, config: &AppConfig) -> HungerState {
    if hunger01 >= config.hunger.starving_threshold {
        HungerState::Starving
    } else if hunger01 >= config.hunger.hungry_threshold {
        HungerState::Hungry
    } else {
        HungerState::Fed
    }
}

/// Stress from dirty water in `[0, 1]`; zero above the stress threshold.
#[must_use]
pub fn water_stress01(hygiene01: f64, config: &AppConfig) -> f64 {
    let ww = &config.water_wellbeing;
    if hygiene01 >= ww.stress_start_hygiene01 {
        return 0.0;
    }
    let t = (ww.stress_start_hygiene01 - hygiene01) / ww.stress_start_hygiene01.max(1e-6);
    clamp01(clamp01(t).powf(ww.stress_curve_power))
}

/// U-shaped sensitivity: highest at birth and near the end of life.
#[must_use]
pub fn age_sensitivity(fish: &Fish, config: &AppConfig) -> f64 {
    let ww = &config.water_wellbeing;
    let ratio = clamp01(fish.age_sec_cached / fish.traits.lifespan_sec.max(1.0));
    let edge = (ratio - 0.5).abs() * 2.0;
    ww.age_sensitivity_min + ww.age_sensitivity_edge_boost * edge * edge
}

/// Drains energy by distance moved and folds water stress into wellbeing.
pub fn update_metabolism(
    fish: &mut Fish,
    dt: f64,
    now_sec: f64,
    hygiene01: f64,
    config: &AppConfig,
) -> Option<DeathReason> {
    if dt <= 0.0 {
        return None;
    }
    fish.eat_anim_timer = (fish.eat_anim_timer - dt).max(0.0);

    if !fish.is_alive() {
        fish.energy01 = 0.0;
        fish.hunger01 = 1.0;
        fish.wellbeing01 = 0.0;
        fish.hunger_state = HungerState::Dead;
        fish.mating_anim = None;
        return None;
    }

    let h = &config.hunger;
    fish.energy01 = clamp01(fish.energy01 - fish.last_distance_moved * h.move_cost_per_px);
    fish.hunger01 = 1.0 - fish.energy01;

    let base = clamp01(1.0 - fish.hunger01.powf(h.wellbeing_hunger_power));
    let stress = water_stress01(hygiene01, config);
    if stress > 0.0 {
        let sensitivity = age_sensitivity(fish, config);
        fish.water_penalty01 = clamp01(
            fish.water_penalty01 + config.water_wellbeing.stress_per_sec * stress * sensitivity * dt,
        );
    }
    fish.wellbeing01 = clamp01(base - fish.water_penalty01);
    fish.hunger_state = hunger_state_for(fish.hunger01, config);

    if fish.energy01 <= 0.0 {
        mark_dead(fish, DeathReason::Starvation, now_sec);
        return Some(DeathReason::Starvation);
    }
    None
}

/// Applies a meal of `amount` nutrition units.
pub fn eat(fish: &mut Fish, amount: f64, config: &AppConfig) {
    if !fish.is_alive() || amount <= 0.0 {
        return;
    }
    fish.energy01 = clamp01(fish.energy01 + clamp01(amount * config.hunger.food_energy_ratio));
    fish.hunger01 = 1.0 - fish.energy01;
    fish.hunger_state = hunger_state_for(fish.hunger01, config);
    fish.eat_anim_timer = fish.eat_anim_duration;
}
