use super::World;
use crate::fish::FishLogic;
use crate::snapshot::{FishContext, FishSnapshot};
use aquarium_data::{DeathReason, WorldEvent, WorldEventKind};

impl World {
    /// Advances the simulation by `raw_delta_sec` scaled by the speed
    /// multiplier and returns the events of this tick.
    ///
    /// A paused world, a non-positive delta or a non-finite delta leaves
    /// every bit of state untouched.
    pub fn update(&mut self, raw_delta_sec: f64) -> Vec<WorldEvent> {
        if self.paused || !raw_delta_sec.is_finite() || raw_delta_sec <= 0.0 {
            return Vec::new();
        }
        let dt = raw_delta_sec * self.speed_multiplier;
        if !dt.is_finite() || dt <= 0.0 {
            return Vec::new();
        }

        let cap_before = self.available_speed_cap();
        self.refresh_species_unlocks();
        self.sim_time_sec += dt;
        let cap_after = self.available_speed_cap();
        if cap_after > cap_before {
            tracing::info!(speed_cap = cap_after, sim_time_sec = self.sim_time_sec, "Speed cap raised");
        }

        self.update_life_cycles();
        self.update_play();
        self.update_reproduction();
        self.update_metabolism(dt);
        self.update_motion(dt);
        self.resolve_feeding();
        self.update_scheduled_poop();
        self.update_food(dt);
        self.update_poop(dt);
        self.update_eggs();
        self.update_nestbrush(dt);
        self.update_berry_reeds(dt);
        self.update_water(dt);
        self.update_fx(dt);

        self.peak_population_count = self.peak_population_count.max(self.fish.len() as u64);
        std::mem::take(&mut self.events)
    }

    fn record_death(&mut self, fish_id: u64, reason: DeathReason) {
        self.deaths_count += 1;
        tracing::info!(fish_id, ?reason, sim_time_sec = self.sim_time_sec, "Fish died");
        self.emit(WorldEventKind::Died {
            fish_id,
            reason: Some(reason),
        });
    }

    fn update_life_cycles(&mut self) {
        let now = self.sim_time_sec;
        let deaths: Vec<(u64, DeathReason)> = self
            .fish
            .iter_mut()
            .filter_map(|fish| {
                fish.update_life_cycle(now, &self.config)
                    .map(|reason| (fish.id, reason))
            })
            .collect();
        for (fish_id, reason) in deaths {
            self.record_death(fish_id, reason);
        }
    }

    fn update_metabolism(&mut self, dt: f64) {
        let now = self.sim_time_sec;
        let hygiene = self.water.hygiene01;
        let deaths: Vec<(u64, DeathReason)> = self
            .fish
            .iter_mut()
            .filter_map(|fish| {
                fish.update_metabolism(dt, now, hygiene, &self.config)
                    .map(|reason| (fish.id, reason))
            })
            .collect();
        for (fish_id, reason) in deaths {
            self.record_death(fish_id, reason);
        }
    }

    /// Decide, then steer, both against one snapshot of the roster.
    fn update_motion(&mut self, dt: f64) {
        let snapshots: Vec<FishSnapshot> = self.fish.iter().map(FishLogic::snapshot).collect();
        let fruits = self.fruit_spots();
        let ctx = FishContext {
            config: &self.config,
            bounds: self.bounds,
            now_sec: self.sim_time_sec,
            hygiene01: self.water.hygiene01,
            fish: &snapshots,
            food: &self.food,
            poop: &self.poop,
            eggs: &self.eggs,
            fruits: &fruits,
        };

        let rng = &mut *self.rng;
        for fish in &mut self.fish {
            fish.decide_behavior(&ctx, rng);
        }
        let mut bursts = Vec::new();
        for fish in &mut self.fish {
            if let Some(at) = fish.apply_steering(dt, &ctx, rng).bubble_burst {
                bursts.push(at);
            }
        }

        for at in bursts {
            self.spawn_mating_bubbles(at);
        }
    }
}
