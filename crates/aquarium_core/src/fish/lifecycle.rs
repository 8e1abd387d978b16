use crate::config::AppConfig;
use crate::geometry::{clamp01, ease_in_out, lerp};
use aquarium_data::{Behavior, DeathReason, Fish, HungerState, LifeStage, LifeState, PlayState};

/// Jittered `(baby_end, juvenile_end)` boundaries in effective-age seconds.
#[must_use]
pub fn stage_bounds(fish: &Fish, config: &AppConfig) -> (f64, f64) {
    let age = &config.age;
    let baby_end = (age.baby_end_sec + fish.stage_shift_baby_sec).max(age.min_baby_end_sec);
    let juvenile_end = (age.juvenile_end_sec + fish.stage_shift_juvenile_sec)
        .max(baby_end + age.min_juvenile_span_sec);
    (baby_end, juvenile_end)
}

/// Raw age at which the fish becomes an adult.
#[must_use]
pub fn adult_start_age(fish: &Fish, config: &AppConfig) -> f64 {
    let (_, juvenile_end) = stage_bounds(fish, config);
    juvenile_end / fish.traits.growth_rate.max(0.01)
}

/// Advances the stage and size clock. Returns the reason if the fish died
/// during this call.
pub fn update_life_cycle(fish: &mut Fish, now_sec: f64, config: &AppConfig) -> Option<DeathReason> {
    let age = fish.age_seconds(now_sec);
    fish.age_sec_cached = age;
    if !fish.is_alive() {
        return None;
    }

    let (baby_end, juvenile_end) = stage_bounds(fish, config);
    let effective_age = age * fish.traits.growth_rate;
    // Old age reads raw age so slow growers never skip adulthood.
    fish.life_stage = if effective_age < baby_end {
        LifeStage::Baby
    } else if effective_age < juvenile_end {
        LifeStage::Juvenile
    } else if age >= fish.traits.lifespan_sec * config.age.old_start_ratio {
        LifeStage::Old
    } else {
        LifeStage::Adult
    };

    fish.growth01 = clamp01(effective_age / juvenile_end.max(1.0));
    fish.size = fish.adult_radius
        * lerp(config.growth.birth_scale, 1.0, ease_in_out(fish.growth01));

    if age >= fish.traits.lifespan_sec {
        mark_dead(fish, DeathReason::OldAge, now_sec);
        return Some(DeathReason::OldAge);
    }
    None
}

/// Irreversible transition to `Dead`. A second call is a no-op.
pub fn mark_dead(fish: &mut Fish, reason: DeathReason, now_sec: f64) {
    if !fish.is_alive() {
        return;
    }
    fish.life_state = LifeState::Dead;
    fish.death_reason = Some(reason);
    fish.dead_at_sec = Some(now_sec);
    fish.history.death_sim_time_sec = Some(now_sec);
    fish.hunger_state = HungerState::Dead;
    fish.energy01 = 0.0;
    fish.hunger01 = 1.0;
    fish.wellbeing01 = 0.0;
    fish.current_speed = 0.0;
    fish.behavior = Behavior::DeadSink;
    fish.mating_anim = None;
    fish.play_state = PlayState {
        cooldown_until_sec: fish.play_state.cooldown_until_sec,
        ..PlayState::default()
    };
    fish.hover.anchor = None;
    fish.hover.offset = None;
    fish.hover.until_sec = 0.0;
}

/// Cruise speed before boosts, in px/s.
#[must_use]
pub fn base_speed(fish: &Fish, config: &AppConfig) -> f64 {
    let f = &config.fish;
    let stage = match fish.life_stage {
        LifeStage::Baby => f.stage_speed.baby,
        LifeStage::Juvenile => f.stage_speed.juvenile,
        LifeStage::Adult => f.stage_speed.adult,
        LifeStage::Old => f.stage_speed.old,
    };
    let species = config.species.get(fish.species_id);
    (f.base_speed_px + fish.size * f.size_speed_factor * fish.traits.speed_factor)
        * f.speed_multiplier
        * stage
        * species.speed_scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fish::test_fish;

    #[test]
    fn test_stage_progression() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.traits.growth_rate = 1.0;
        fish.traits.lifespan_sec = 10_000.0;
        fish.spawn_time_sec = 0.0;

        update_life_cycle(&mut fish, 100.0, &config);
        assert_eq!(fish.life_stage, LifeStage::Baby);
        update_life_cycle(&mut fish, 2000.0, &config);
        assert_eq!(fish.life_stage, LifeStage::Juvenile);
        update_life_cycle(&mut fish, 5000.0, &config);
        assert_eq!(fish.life_stage, LifeStage::Adult);
        assert_eq!(fish.growth01, 1.0);
        assert!((fish.size - fish.adult_radius).abs() < 1e-9);
        update_life_cycle(&mut fish, 9100.0, &config);
        assert_eq!(fish.life_stage, LifeStage::Old);
    }

    #[test]
    fn test_old_age_death_is_idempotent() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.traits.lifespan_sec = 500.0;
        assert_eq!(
            update_life_cycle(&mut fish, 600.0, &config),
            Some(DeathReason::OldAge)
        );
        assert!(!fish.is_alive());
        assert_eq!(fish.behavior, Behavior::DeadSink);
        assert_eq!(update_life_cycle(&mut fish, 700.0, &config), None);
        assert_eq!(fish.dead_at_sec, Some(600.0));
    }

    #[test]
    fn test_stage_bounds_respect_minimums() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.stage_shift_baby_sec = -5000.0;
        fish.stage_shift_juvenile_sec = -5000.0;
        let (baby, juvenile) = stage_bounds(&fish, &config);
        assert_eq!(baby, 30.0);
        assert_eq!(juvenile, 90.0);
    }

    #[test]
    fn test_base_speed_scales_with_species() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.life_stage = LifeStage::Adult;
        fish.size = 20.0;
        fish.traits.speed_factor = 0.5;
        assert!((base_speed(&fish, &config) - 43.5).abs() < 1e-9);
        fish.species_id = aquarium_data::SpeciesId::AzureDart;
        assert!((base_speed(&fish, &config) - 87.0).abs() < 1e-9);
    }
}
