//! Water quality: corpses, bioload, the filter rig and hygiene.
//!
//! Install, maintenance and upgrade are timed operations. Starting one only
//! nudges its progress above zero; [`World::update_water`] advances the bar
//! and commits the discrete filter state once it reaches one.

use super::World;
use crate::geometry::clamp01;
use aquarium_data::Feature;

/// Progress value that marks a timed operation as started.
const PROGRESS_STARTED: f64 = 0.000_001;

impl World {
    /// Feeds required before the filter can reach `tier`.
    #[must_use]
    pub fn filter_tier_unlock_feeds(&self, tier: u8) -> u64 {
        let multipliers = self.config.water.tier_feed_multipliers;
        let index = usize::from(tier.clamp(1, 3)) - 1;
        u64::from(self.initial_fish_count) * multipliers[index]
    }

    /// Sum of species bioload factors over the roster, corpses included,
    /// relative to the reference population.
    #[must_use]
    pub fn bioload(&self) -> f64 {
        let units: f64 = self
            .fish
            .iter()
            .map(|f| self.config.species.get(f.species_id).bioload_factor)
            .sum();
        units / self.config.water.reference_fish_count.max(1.0)
    }

    /// Starts installing the filter. Needs the filter unlock.
    pub fn install_water_filter(&mut self) -> bool {
        let unlocked = self.is_feature_unlocked(Feature::WaterFilter);
        let water = &mut self.water;
        if !unlocked || water.filter_installed || water.install_progress01 > 0.0 {
            return false;
        }
        water.install_progress01 = PROGRESS_STARTED;
        tracing::info!("Water filter install started");
        true
    }

    /// Starts a maintenance cycle that restores filter health.
    pub fn maintain_water_filter(&mut self) -> bool {
        let water = &mut self.water;
        if !water.filter_installed
            || water.install_progress01 > 0.0
            || water.maintenance_progress01 > 0.0
            || water.maintenance_cooldown_sec > 0.0
        {
            return false;
        }
        water.maintenance_progress01 = PROGRESS_STARTED;
        tracing::info!(filter01 = water.filter01, "Water filter maintenance started");
        true
    }

    /// Starts an upgrade to the next tier. The filter is off until it completes.
    pub fn upgrade_water_filter(&mut self) -> bool {
        let water = &self.water;
        if !water.filter_installed
            || !water.filter_enabled
            || water.install_progress01 > 0.0
            || water.maintenance_progress01 > 0.0
            || water.filter_tier >= self.config.water.max_tier
        {
            return false;
        }
        let next_tier = (water.filter_tier + 1).max(2);
        let required = self.filter_tier_unlock_feeds(next_tier);
        if !self.config.world.dev_mode && self.foods_consumed_count < required {
            return false;
        }

        let water = &mut self.water;
        water.upgrade_target_tier = next_tier;
        water.upgrade_progress01 = PROGRESS_STARTED;
        water.filter_enabled = false;
        tracing::info!(target_tier = next_tier, "Water filter upgrade started");
        true
    }

    /// Flips the filter on or off. Returns the resulting state; nothing
    /// changes while any timed operation runs.
    pub fn toggle_water_filter_enabled(&mut self) -> bool {
        let water = &mut self.water;
        if !water.filter_installed || water.is_busy() {
            return water.filter_enabled;
        }
        water.filter_enabled = !water.filter_enabled;
        water.filter_enabled
    }

    fn update_corpses(&mut self) {
        let now = self.sim_time_sec;
        let cfg = self.config.corpse.clone();
        let mut dirt = 0.0;
        let mut decayed = Vec::new();

        for fish in &mut self.fish {
            if fish.is_alive() || fish.corpse_removed {
                continue;
            }
            let dead_at = *fish.dead_at_sec.get_or_insert(now);
            let dead_for = (now - dead_at).max(0.0);
            let target = if dead_for >= cfg.grace_sec {
                let steps = ((dead_for - cfg.grace_sec) / cfg.dirt_step_sec).floor();
                (cfg.dirt_initial01 + cfg.dirt_step01 * steps).clamp(0.0, cfg.dirt_max01)
            } else {
                0.0
            };
            let applied = fish.corpse_dirt_applied01.clamp(0.0, cfg.dirt_max01);
            if target > applied {
                dirt += target - applied;
                fish.corpse_dirt_applied01 = target;
            }
            if fish.corpse_dirt_applied01 >= cfg.dirt_max01 {
                fish.corpse_removed = true;
                decayed.push(fish.id);
            }
        }

        self.water.dirt01 = clamp01(self.water.dirt01 + dirt);
        for fish_id in decayed {
            if let Some(index) = self.fish_index(fish_id) {
                self.retire_fish(index);
                tracing::debug!(fish_id, "Corpse fully decayed");
            }
        }
    }

    fn advance_filter_operations(&mut self, dt: f64) {
        let cfg = &self.config.water;
        let water = &mut self.water;

        if water.install_progress01 > 0.0 && !water.filter_installed {
            water.install_progress01 =
                clamp01(water.install_progress01 + dt / cfg.install_duration_sec);
            if water.install_progress01 >= 1.0 {
                water.filter_installed = true;
                water.filter_enabled = true;
                water.filter01 = 1.0;
                water.filter_tier = water.filter_tier.max(1);
                water.install_progress01 = 0.0;
                tracing::info!(tier = water.filter_tier, "Water filter installed");
            }
        }

        if water.maintenance_cooldown_sec > 0.0 {
            water.maintenance_cooldown_sec = (water.maintenance_cooldown_sec - dt).max(0.0);
        }

        if water.maintenance_progress01 > 0.0 {
            water.maintenance_progress01 =
                clamp01(water.maintenance_progress01 + dt / cfg.maintenance_duration_sec);
            if water.maintenance_progress01 >= 1.0 {
                water.filter01 = clamp01(cfg.maintenance_restore_to01);
                water.maintenance_progress01 = 0.0;
                water.maintenance_cooldown_sec = cfg.maintenance_cooldown_sec;
                tracing::info!(filter01 = water.filter01, "Water filter maintained");
            }
        }

        if water.upgrade_progress01 > 0.0 {
            water.upgrade_progress01 =
                clamp01(water.upgrade_progress01 + dt / cfg.install_duration_sec);
            water.filter_enabled = false;
            if water.upgrade_progress01 >= 1.0 {
                let target = if water.upgrade_target_tier > 0 {
                    water.upgrade_target_tier
                } else {
                    water.filter_tier + 1
                };
                water.filter_tier = water.filter_tier.max(target).clamp(1, cfg.max_tier);
                water.filter01 = 1.0;
                water.upgrade_progress01 = 0.0;
                water.upgrade_target_tier = 0;
                water.filter_enabled = true;
                tracing::info!(tier = water.filter_tier, "Water filter upgraded");
            }
        }
    }

    /// Corpse decay, filter bookkeeping, dirt and hygiene for one step.
    pub(crate) fn update_water(&mut self, dt: f64) {
        let expired_food = std::mem::take(&mut self.expired_food_since_water_update);
        let poop_dirt = std::mem::take(&mut self.pending_poop_dirt01).max(0.0);
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        self.update_corpses();
        let bioload = self.bioload();
        self.water.filter_unlocked = self.is_filter_unlocked();
        self.advance_filter_operations(dt);

        let cfg = &self.config.water;
        let water = &mut self.water;
        let working = water.filter_installed
            && water.filter_enabled
            && water.maintenance_progress01 <= 0.0
            && water.upgrade_progress01 <= 0.0
            && water.filter01 > cfg.filter_depleted_threshold01;
        let filter = if working { water.filter01 } else { 0.0 };
        water.effective_filter01 = filter;

        let extra_tiers = f64::from(water.filter_tier.min(cfg.max_tier).saturating_sub(1));
        let dirt_tier = 1.0 + extra_tiers * cfg.tier_dirt_removal_step;
        let bioload_tier = 1.0 + extra_tiers * cfg.tier_bioload_step;
        let wear_tier = 1.0 + extra_tiers * cfg.tier_wear_step;

        let effective_bioload = (bioload
            * (1.0 - filter * cfg.bioload_mitigation_factor * bioload_tier))
            .clamp(0.0, bioload.max(0.0));

        let added = cfg.bioload_dirt_per_sec * bioload * dt
            + f64::from(expired_food) * cfg.dirt_per_expired_food
            + poop_dirt;
        water.dirt01 = clamp01(water.dirt01 + added);
        water.dirt01 = clamp01(water.dirt01 - cfg.filter_dirt_remove_per_sec * filter * dirt_tier * dt);

        if water.filter_installed {
            let wear = cfg.wear_base_per_sec
                * wear_tier
                * (1.0 + cfg.wear_bioload_factor * bioload)
                * (1.0 + cfg.wear_dirt_factor * water.dirt01);
            water.filter01 = clamp01(water.filter01 - wear * dt);
        }

        let dirt_multiplier =
            1.0 + water.dirt01.powf(cfg.dirt_decay_power) * cfg.dirt_decay_strength;
        let decay = cfg.baseline_decay_per_sec * effective_bioload * dirt_multiplier * dt;
        let mitigation =
            cfg.baseline_decay_per_sec * (bioload - effective_bioload).max(0.0) * dt;
        let filter_recovery = if water.filter_tier >= 2 {
            cfg.hygiene_recovery_per_sec * filter * (1.0 - water.dirt01) * dt
        } else {
            0.0
        };
        water.hygiene01 = clamp01(water.hygiene01 - decay + mitigation + filter_recovery);
    }
}
