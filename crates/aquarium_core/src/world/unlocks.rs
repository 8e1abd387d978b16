//! Feature gates, player-added species and the simulation speed cap.

use super::init::NewFish;
use super::World;
use crate::fish::lifecycle::{stage_bounds, update_life_cycle};
use crate::rng::range;
use aquarium_data::{
    ActionFailure, ActionResult, Feature, LifeStage, Sex, SpeciesId, SpeedUnlock,
    SpeedUnlockState,
};

impl World {
    /// Latches species and plant unlocks whose conditions hold right now.
    pub(crate) fn refresh_species_unlocks(&mut self) {
        let before = self.species_unlocks;
        let unlocks = &mut self.species_unlocks;
        if self.config.world.dev_mode {
            unlocks.berry_reed = true;
            unlocks.azure_dart = true;
            unlocks.silt_sifter = true;
        } else {
            let cfg = &self.config.unlocks;
            let hygiene = self.water.hygiene01;
            if self.births_count >= cfg.berry_reed_births && hygiene >= cfg.berry_reed_hygiene01 {
                unlocks.berry_reed = true;
            }
            if !self.berry_reed_plants.is_empty() && hygiene >= cfg.azure_hygiene01 {
                unlocks.azure_dart = true;
            }
            if self.births_count >= cfg.silt_births {
                unlocks.silt_sifter = true;
            }
        }

        let after = self.species_unlocks;
        for (was, is, feature) in [
            (before.berry_reed, after.berry_reed, Feature::BerryReed),
            (before.azure_dart, after.azure_dart, Feature::AzureDart),
            (before.silt_sifter, after.silt_sifter, Feature::SiltSifter),
        ] {
            if is && !was {
                tracing::info!(?feature, sim_time_sec = self.sim_time_sec, "Feature unlocked");
            }
        }
    }

    #[must_use]
    pub fn is_filter_unlocked(&self) -> bool {
        self.config.world.dev_mode
            || self.foods_consumed_count >= self.filter_tier_unlock_feeds(1)
            || self.filter_unlocked
            || self.water.filter_unlocked
    }

    #[must_use]
    pub fn is_feature_unlocked(&self, feature: Feature) -> bool {
        if self.config.world.dev_mode {
            return true;
        }
        match feature {
            Feature::WaterFilter => self.is_filter_unlocked(),
            Feature::Nestbrush => self.births_count >= self.config.unlocks.nestbrush_births,
            Feature::BerryReed => {
                self.species_unlocks.berry_reed
                    || (self.births_count >= self.config.unlocks.berry_reed_births
                        && self.water.hygiene01 >= self.config.unlocks.berry_reed_hygiene01)
            }
            Feature::AzureDart => self.species_unlocks.azure_dart,
            Feature::SiltSifter => self.species_unlocks.silt_sifter,
        }
    }

    /// Raises every counter past its unlock threshold.
    pub fn grant_all_unlock_prerequisites(&mut self) {
        self.births_count = self.births_count.max(999);
        self.foods_consumed_count = self
            .foods_consumed_count
            .max(self.filter_tier_unlock_feeds(3));
        self.water.hygiene01 = self.water.hygiene01.max(0.95);
        self.filter_unlocked = self.is_filter_unlocked();
        self.refresh_species_unlocks();
        tracing::info!("All unlock prerequisites granted");
    }

    fn alive_count_of(&self, species: SpeciesId) -> usize {
        self.fish
            .iter()
            .filter(|f| f.is_alive() && f.species_id == species)
            .count()
    }

    /// The sex with fewer live members of `species`, females on a tie.
    fn balancing_sex(&self, species: SpeciesId) -> Sex {
        let count = |sex: Sex| {
            self.fish
                .iter()
                .filter(|f| f.is_alive() && f.species_id == species && f.sex == sex)
                .count()
        };
        if count(Sex::Female) <= count(Sex::Male) {
            Sex::Female
        } else {
            Sex::Male
        }
    }

    fn check_species_slot(&mut self, species: SpeciesId, feature: Feature, cap: usize) -> ActionResult {
        if self.alive_count_of(species) >= cap {
            return Err(ActionFailure::MaxCount);
        }
        self.refresh_species_unlocks();
        if !self.is_feature_unlocked(feature) {
            return Err(ActionFailure::Locked);
        }
        Ok(())
    }

    /// Adds a newborn AZURE_DART.
    pub fn add_azure_dart(&mut self) -> ActionResult {
        let cap = self.config.unlocks.azure_max_count;
        self.check_species_slot(SpeciesId::AzureDart, Feature::AzureDart, cap)?;

        let sex = self.balancing_sex(SpeciesId::AzureDart);
        let fish = self.create_fish(NewFish {
            species_id: SpeciesId::AzureDart,
            sex: Some(sex),
            ..NewFish::default()
        });
        tracing::info!(fish_id = fish.id, ?sex, "Azure dart added");
        self.fish.push(fish);
        self.peak_population_count = self.peak_population_count.max(self.fish.len() as u64);
        Ok(())
    }

    /// Adds a SILT_SIFTER that is already past the baby stage.
    pub fn add_silt_sifter(&mut self) -> ActionResult {
        let cap = self.config.unlocks.silt_max_count;
        self.check_species_slot(SpeciesId::SiltSifter, Feature::SiltSifter, cap)?;

        let sex = self.balancing_sex(SpeciesId::SiltSifter);
        let baby_end = self.config.age.baby_end_sec.max(1.0);
        let seed_age = baby_end + range(&mut *self.rng, 10.0, (baby_end * 0.35).max(20.0));
        let mut fish = self.create_fish(NewFish {
            species_id: SpeciesId::SiltSifter,
            sex: Some(sex),
            initial_age_sec: seed_age,
            ..NewFish::default()
        });

        let now = self.sim_time_sec;
        fish.spawn_time_sec = now - seed_age;
        update_life_cycle(&mut fish, now, &self.config);
        if fish.life_stage == LifeStage::Baby {
            let (fish_baby_end, _) = stage_bounds(&fish, &self.config);
            let age = fish_baby_end / fish.traits.growth_rate.max(0.001) + 12.0;
            fish.spawn_time_sec = now - age;
            update_life_cycle(&mut fish, now, &self.config);
        }

        tracing::info!(fish_id = fish.id, ?sex, stage = ?fish.life_stage, "Silt sifter added");
        self.fish.push(fish);
        self.peak_population_count = self.peak_population_count.max(self.fish.len() as u64);
        Ok(())
    }

    /// Highest speed multiplier reachable at `sim_time_sec`.
    #[must_use]
    pub fn speed_cap_at(&self, sim_time_sec: f64) -> f64 {
        let cfg = &self.config.world;
        if cfg.dev_mode {
            return cfg.dev_speed_cap;
        }
        cfg.speed_unlocks
            .iter()
            .filter(|(_, at)| sim_time_sec >= *at)
            .map(|(multiplier, _)| *multiplier)
            .fold(1.0, f64::max)
    }

    #[must_use]
    pub fn available_speed_cap(&self) -> f64 {
        self.speed_cap_at(self.sim_time_sec)
    }

    /// Clamps into `[min_speed_multiplier, cap]`. Non-finite input keeps the
    /// current multiplier. Returns the multiplier in effect.
    pub fn set_speed_multiplier(&mut self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.speed_multiplier;
        }
        let min = self.config.world.min_speed_multiplier;
        self.speed_multiplier = value.min(self.available_speed_cap()).max(min);
        self.speed_multiplier
    }

    #[must_use]
    pub fn speed_unlock_state(&self) -> SpeedUnlockState {
        let now = self.sim_time_sec.max(0.0).floor();
        let pending_unlocks = if self.config.world.dev_mode {
            Vec::new()
        } else {
            self.config
                .world
                .speed_unlocks
                .iter()
                .filter(|(_, at)| now < *at)
                .map(|&(target_multiplier, unlock_at_sec)| SpeedUnlock {
                    target_multiplier,
                    unlock_at_sec,
                    remaining_sec: unlock_at_sec - now,
                })
                .collect()
        };
        SpeedUnlockState {
            speed_cap: self.available_speed_cap(),
            pending_unlocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::world_with;
    use super::*;
    use aquarium_data::BerryReedPlant;

    fn reed() -> BerryReedPlant {
        BerryReedPlant {
            id: 1,
            x: 600.0,
            bottom_y: 696.0,
            height: 100.0,
            spawn_height: 100.0,
            max_height: 180.0,
            sway_phase: 0.0,
            sway_rate: 0.001,
            branches: Vec::new(),
            next_fruit_at_sec: None,
            growth_elapsed_sec: 0.0,
        }
    }

    #[test]
    fn test_speed_cap_steps_with_time() {
        let mut world = world_with(2, 1);
        assert_eq!(world.set_speed_multiplier(3.0), 1.0);
        world.sim_time_sec = 30.0 * 60.0;
        assert_eq!(world.set_speed_multiplier(3.0), 2.0);
        world.sim_time_sec = 120.0 * 60.0;
        assert_eq!(world.set_speed_multiplier(3.0), 3.0);
        assert_eq!(world.set_speed_multiplier(0.1), 0.5);
        assert_eq!(world.set_speed_multiplier(f64::NAN), 0.5);
    }

    #[test]
    fn test_speed_unlock_state_lists_pending() {
        let mut world = world_with(2, 1);
        world.sim_time_sec = 100.4;
        let state = world.speed_unlock_state();
        assert_eq!(state.speed_cap, 1.0);
        assert_eq!(state.pending_unlocks.len(), 2);
        assert_eq!(state.pending_unlocks[0].remaining_sec, 1800.0 - 100.0);
        world.config.world.dev_mode = true;
        let state = world.speed_unlock_state();
        assert_eq!(state.speed_cap, 16.0);
        assert!(state.pending_unlocks.is_empty());
    }

    #[test]
    fn test_filter_unlock_follows_feeds() {
        let mut world = world_with(4, 1);
        assert!(!world.is_feature_unlocked(Feature::WaterFilter));
        world.foods_consumed_count = 16;
        assert!(world.is_feature_unlocked(Feature::WaterFilter));
    }

    #[test]
    fn test_species_unlocks_latch() {
        let mut world = world_with(2, 1);
        world.berry_reed_plants.push(reed());
        world.refresh_species_unlocks();
        assert!(world.is_feature_unlocked(Feature::AzureDart));
        world.berry_reed_plants.clear();
        world.water.hygiene01 = 0.1;
        world.refresh_species_unlocks();
        assert!(world.is_feature_unlocked(Feature::AzureDart));
        assert!(!world.is_feature_unlocked(Feature::SiltSifter));
    }

    #[test]
    fn test_azure_darts_are_capped_and_balanced() {
        let mut world = world_with(2, 1);
        assert_eq!(world.add_azure_dart(), Err(ActionFailure::Locked));
        world.config.world.dev_mode = true;
        for _ in 0..4 {
            assert_eq!(world.add_azure_dart(), Ok(()));
        }
        assert_eq!(world.add_azure_dart(), Err(ActionFailure::MaxCount));
        let females = world
            .fish
            .iter()
            .filter(|f| f.species_id == SpeciesId::AzureDart && f.is_female())
            .count();
        assert_eq!(females, 2);
    }

    #[test]
    fn test_silt_sifter_spawns_past_baby_stage() {
        let mut world = world_with(2, 1);
        world.grant_all_unlock_prerequisites();
        assert_eq!(world.add_silt_sifter(), Ok(()));
        let fish = world.fish.last().unwrap();
        assert_eq!(fish.species_id, SpeciesId::SiltSifter);
        assert_ne!(fish.life_stage, LifeStage::Baby);
    }
}
