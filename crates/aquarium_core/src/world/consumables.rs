//! Food, poop, eggs and fruit as things to eat, plus the passes that move
//! and expire them.

use super::{ScheduledPoop, World};
use crate::fish::FishLogic;
use crate::geometry::clamp01;
use crate::rng::{range, range_of};
use aquarium_data::{
    EdibleKind, EggState, Food, FxParticle, Poop, Vec2, WorldEventKind,
};

/// How a poop spawn affects the tank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoopSpawn {
    pub bioload_factor: f64,
    /// Invisible poop skips the entity list and dirties the water at once.
    pub visible: bool,
}

impl Default for PoopSpawn {
    fn default() -> Self {
        Self {
            bioload_factor: 1.0,
            visible: true,
        }
    }
}

const CONSUMED_EPSILON: f64 = 0.001;

impl World {
    /// Drops a pellet. Position is clamped into the tank.
    pub fn spawn_food(&mut self, x: f64, y: f64, amount: Option<f64>, ttl_sec: Option<f64>) -> u64 {
        let cfg = &self.config.food;
        let position = self.bounds.clamp_point(Vec2::new(
            if x.is_finite() { x } else { self.bounds.width * 0.5 },
            if y.is_finite() { y } else { 0.0 },
        ));
        let amount = amount
            .filter(|a| a.is_finite())
            .unwrap_or(cfg.default_amount)
            .max(cfg.min_amount);
        let ttl = ttl_sec
            .filter(|t| t.is_finite())
            .unwrap_or(cfg.default_ttl_sec)
            .max(0.0);
        let vy = range_of(&mut *self.rng, cfg.initial_fall_speed);

        let id = self.next_ids.food;
        self.next_ids.food += 1;
        self.food.push(Food {
            id,
            x: position.x,
            y: position.y,
            amount,
            ttl,
            vy,
        });
        self.emit(WorldEventKind::FoodSpawned {
            food_id: id,
            x: position.x,
            y: position.y,
            amount,
        });
        id
    }

    /// Adds waste at a point. Returns the new poop id, or `None` for
    /// invisible poop which only dirties the water.
    pub fn spawn_poop(&mut self, x: f64, y: f64, ttl_sec: Option<f64>, spawn: PoopSpawn) -> Option<u64> {
        let factor = if spawn.bioload_factor.is_finite() {
            spawn.bioload_factor.max(0.0)
        } else {
            0.0
        };
        self.water.hygiene01 =
            clamp01(self.water.hygiene01 - self.config.water.hygiene_drop_per_poop_spawn * factor);

        if !spawn.visible {
            self.pending_poop_dirt01 += self.config.poop.invisible_dirt * factor;
            return None;
        }

        let cfg = &self.config.poop;
        let position = self.bounds.clamp_point(Vec2::new(
            if x.is_finite() { x } else { 0.0 },
            if y.is_finite() { y } else { 0.0 },
        ));
        let ttl = ttl_sec
            .filter(|t| t.is_finite())
            .unwrap_or(cfg.default_ttl_sec)
            .max(0.0);
        let id = self.next_ids.poop;
        self.next_ids.poop += 1;
        self.poop.push(Poop {
            id,
            x: position.x,
            y: position.y,
            ttl_sec: ttl,
            max_ttl_sec: ttl.max(1.0),
            vx: 0.0,
            vy: cfg.drift_speed,
            can_be_eaten: true,
            nutrition: cfg.nutrition,
            bioload_factor: factor,
        });
        Some(id)
    }

    /// Takes a bite of at least `min_bite` out of a pellet. Returns the
    /// amount eaten, `0.0` when the pellet is gone.
    pub fn consume_food(&mut self, food_id: u64, requested: f64) -> f64 {
        let Some(index) = self.food.iter().position(|f| f.id == food_id) else {
            return 0.0;
        };
        let bite = if requested.is_finite() {
            requested.max(self.config.food.min_bite)
        } else {
            self.config.food.min_bite
        };
        let pellet = &mut self.food[index];
        let consumed = pellet.amount.min(bite).max(0.0);
        pellet.amount -= consumed;
        if pellet.amount <= CONSUMED_EPSILON {
            self.food.remove(index);
        }

        if consumed > 0.0 {
            self.emit(WorldEventKind::FoodConsumed { food_id, consumed });
            self.foods_consumed_count += 1;
            self.food_amount_consumed_total += consumed;
            if !self.filter_unlocked
                && self.foods_consumed_count >= u64::from(self.initial_fish_count) * self.config.water.tier_feed_multipliers[0]
            {
                self.filter_unlocked = true;
                tracing::info!(feeds = self.foods_consumed_count, "Water filter unlocked");
            }
        }
        consumed
    }

    /// Removes an edible poop and returns its nutrition.
    pub fn consume_poop(&mut self, poop_id: u64, eater_id: Option<u64>) -> f64 {
        let Some(index) = self
            .poop
            .iter()
            .position(|p| p.id == poop_id && p.can_be_eaten)
        else {
            return 0.0;
        };
        let poop = self.poop.remove(index);
        if let Some(fish_id) = eater_id {
            self.emit(WorldEventKind::PoopConsumed { poop_id, fish_id });
        }
        poop.nutrition.max(0.05)
    }

    /// Removes an unprotected incubating egg of an edible species and
    /// returns its nutrition.
    pub fn consume_egg(&mut self, egg_id: u64, eater_id: Option<u64>) -> f64 {
        let species = &self.config.species;
        let Some(index) = self.eggs.iter().position(|e| {
            e.id == egg_id
                && e.state == EggState::Incubating
                && e.can_be_eaten
                && !e.is_protected_by_nestbrush
                && species.get(e.species_id).eggs_edible
        }) else {
            return 0.0;
        };
        let egg = self.eggs.remove(index);
        if let Some(fish_id) = eater_id {
            self.emit(WorldEventKind::EggConsumed { egg_id, fish_id });
        }
        egg.nutrition.max(0.05)
    }

    /// Picks a fruit off the reed.
    pub fn consume_fruit(&mut self, fruit_id: u64) -> f64 {
        let Some(index) = self.fruits.iter().position(|f| f.id == fruit_id) else {
            return 0.0;
        };
        self.fruits.remove(index);
        self.foods_consumed_count += 1;
        self.emit(WorldEventKind::FruitConsumed { fruit_id });
        self.config.fixtures.fruit_nutrition
    }

    /// Queues a poop from a live fish `delay_sec` from now.
    pub fn schedule_poop_from_fish(&mut self, fish_id: u64, delay_sec: f64) -> bool {
        if !self.fish.iter().any(|f| f.id == fish_id && f.is_alive()) {
            return false;
        }
        let delay = if delay_sec.is_finite() {
            delay_sec.clamp(0.0, self.config.poop.max_delay_sec)
        } else {
            0.0
        };
        self.scheduled_poop.push(ScheduledPoop {
            fish_id,
            spawn_at_sec: self.sim_time_sec + delay,
        });
        true
    }

    pub(crate) fn update_scheduled_poop(&mut self) {
        let now = self.sim_time_sec;
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.scheduled_poop)
            .into_iter()
            .partition(|entry| now >= entry.spawn_at_sec);
        self.scheduled_poop = pending;

        for entry in due {
            let Some(fish) = self.fish.iter().find(|f| f.id == entry.fish_id && f.is_alive()) else {
                continue;
            };
            let profile = self.config.species.get(fish.species_id);
            let spawn = PoopSpawn {
                bioload_factor: profile.poop_bioload_factor,
                visible: profile.poop_is_visible(),
            };
            let position = fish.position;
            self.spawn_poop(position.x, position.y, None, spawn);
        }
    }

    /// Resolves bites for every fish whose target is within reach.
    pub(crate) fn resolve_feeding(&mut self) {
        let now = self.sim_time_sec;
        for index in 0..self.fish.len() {
            let fish = &self.fish[index];
            if !fish.is_alive() {
                continue;
            }
            let Some(target) = fish.behavior.food_target() else {
                continue;
            };
            let position = match target.kind {
                EdibleKind::Pellet => self
                    .food
                    .iter()
                    .find(|f| f.id == target.id)
                    .map(|f| Vec2::new(f.x, f.y)),
                EdibleKind::Poop => self
                    .poop
                    .iter()
                    .find(|p| p.id == target.id)
                    .map(|p| Vec2::new(p.x, p.y)),
                EdibleKind::Egg => self
                    .eggs
                    .iter()
                    .find(|e| e.id == target.id)
                    .map(|e| Vec2::new(e.x, e.y)),
                EdibleKind::Fruit => self.fruit_position(target.id),
            };
            let Some(position) = position else {
                continue;
            };
            if !fish.can_reach(position, self.bounds, &self.config) {
                continue;
            }

            let fish_id = fish.id;
            let species_id = fish.species_id;
            let nutrition = match target.kind {
                EdibleKind::Pellet => {
                    let amount = self
                        .food
                        .iter()
                        .find(|f| f.id == target.id)
                        .map_or(0.0, |f| f.amount);
                    self.consume_food(target.id, amount)
                }
                EdibleKind::Fruit => self.consume_fruit(target.id),
                EdibleKind::Poop => {
                    let n = self.consume_poop(target.id, Some(fish_id));
                    if n > 0.0 {
                        self.fish[index].last_poop_consumed_at_sec = Some(now);
                    }
                    n
                }
                EdibleKind::Egg => {
                    let n = self.consume_egg(target.id, Some(fish_id));
                    if n > 0.0 {
                        let cooldown = self.config.species.get(species_id).egg_snack_cooldown_sec;
                        let fish = &mut self.fish[index];
                        fish.last_egg_consumed_at_sec = Some(now);
                        fish.egg_snack_cooldown_until_sec = now + cooldown;
                    }
                    n
                }
            };
            if nutrition <= 0.0 {
                continue;
            }

            self.fish[index].eat(nutrition, &self.config);
            if matches!(target.kind, EdibleKind::Pellet | EdibleKind::Fruit) {
                self.record_meal(index);
            }
        }
    }

    fn record_meal(&mut self, index: usize) {
        let poop_enabled = self.config.species.get(self.fish[index].species_id).poop_enabled;
        let bites_per_poop = self.config.poop.bites_per_poop;
        let fish = &mut self.fish[index];
        fish.history.meals_eaten += 1;
        if !poop_enabled {
            return;
        }
        fish.digest_bites += 1;
        if fish.digest_bites >= bites_per_poop {
            fish.digest_bites = 0;
            let fish_id = fish.id;
            let delay = range_of(&mut *self.rng, self.config.poop.delay_sec);
            self.schedule_poop_from_fish(fish_id, delay);
        }
    }

    pub(crate) fn update_food(&mut self, dt: f64) {
        let cfg = &self.config.food;
        let bottom = self.bounds.swim_height();
        let mut expired = Vec::new();
        for pellet in &mut self.food {
            pellet.ttl -= dt;
            pellet.vy += cfg.fall_accel * dt;
            pellet.y += pellet.vy * dt;
            if pellet.y >= bottom {
                pellet.y = bottom;
                pellet.vy *= cfg.fall_damping;
            } else {
                pellet.vy = pellet.vy.min(cfg.max_fall_speed);
            }
            if pellet.ttl <= 0.0 {
                expired.push(pellet.id);
            }
        }
        if expired.is_empty() {
            return;
        }

        self.food.retain(|f| !expired.contains(&f.id));
        let drop = self.config.water.hygiene_drop_per_expired_food;
        for food_id in expired {
            self.expired_food_since_water_update += 1;
            self.water.hygiene01 = clamp01(self.water.hygiene01 - drop);
            self.emit(WorldEventKind::FoodExpired { food_id });
        }
    }

    pub(crate) fn update_poop(&mut self, dt: f64) {
        let cfg = &self.config.poop;
        let width = self.bounds.width.max(0.0);
        let bottom = self.bounds.swim_height();
        let blend = (cfg.drift_blend_rate * dt).min(1.0);
        let mut dissolved_dirt = 0.0;

        self.poop.retain_mut(|poop| {
            poop.ttl_sec -= dt;
            poop.vy = poop.vy.abs();
            poop.vy += (cfg.drift_speed - poop.vy) * blend;
            poop.vx *= cfg.drift_damping;
            poop.vy *= cfg.drift_damping;
            poop.x = (poop.x + poop.vx * dt).clamp(0.0, width);
            poop.y += poop.vy * dt;
            if poop.y >= bottom {
                poop.y = bottom;
                poop.vy = 0.0;
                poop.vx *= cfg.bottom_friction;
            } else if poop.y <= 0.0 {
                poop.y = 0.0;
                poop.vy = poop.vy.max(0.0);
            }
            if poop.ttl_sec <= 0.0 {
                dissolved_dirt += cfg.dissolve_dirt * poop.bioload_factor.max(0.0);
                false
            } else {
                true
            }
        });
        self.pending_poop_dirt01 += dissolved_dirt;
    }

    pub(crate) fn spawn_mating_bubbles(&mut self, at: Vec2) {
        for _ in 0..2 {
            let rng = &mut *self.rng;
            let x = at.x + range(rng, -4.0, 4.0);
            let y = at.y + range(rng, -4.0, 4.0);
            let p = self.bounds.clamp_point(Vec2::new(x, y));
            self.fx_particles.push(FxParticle {
                x: p.x,
                y: p.y,
                vx: range(rng, -2.2, 2.2),
                vy: range(rng, -12.0, -8.0),
                radius: range(rng, 1.2, 2.0),
                ttl_sec: 0.8,
            });
        }
    }

    pub(crate) fn update_fx(&mut self, dt: f64) {
        let bounds = self.bounds;
        self.fx_particles.retain_mut(|p| {
            p.ttl_sec -= dt;
            let next = bounds.clamp_point(Vec2::new(p.x + p.vx * dt, p.y + p.vy * dt));
            p.x = next.x;
            p.y = next.y;
            p.ttl_sec > 0.0
        });
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::world_with;
    use super::*;
    use aquarium_data::{Egg, Traits};

    fn egg(id: u64, protected: bool) -> Egg {
        Egg {
            id,
            x: 100.0,
            y: 100.0,
            laid_at_sec: 0.0,
            hatch_at_sec: 1e9,
            mother_id: None,
            father_id: None,
            mother_traits: Traits::default(),
            father_traits: Traits::default(),
            species_id: aquarium_data::SpeciesId::LabMinnow,
            state: EggState::Incubating,
            can_be_eaten: true,
            nutrition: 0.25,
            is_protected_by_nestbrush: protected,
            nestbrush_attachment: None,
        }
    }

    #[test]
    fn test_every_second_meal_schedules_poop() {
        let mut world = world_with(1, 6);
        let [min_delay, max_delay] = world.config.poop.delay_sec;
        world.record_meal(0);
        assert_eq!(world.fish[0].digest_bites, 1);
        assert!(world.scheduled_poop().is_empty());

        world.record_meal(0);
        assert_eq!(world.fish[0].digest_bites, 0);
        assert_eq!(world.fish[0].history.meals_eaten, 2);
        let owed = world.scheduled_poop();
        assert_eq!(owed.len(), 1);
        assert_eq!(owed[0].fish_id, world.fish[0].id);
        let delay = owed[0].spawn_at_sec - world.sim_time_sec;
        assert!(delay >= min_delay && delay <= max_delay);
    }

    #[test]
    fn test_spawn_food_clamps_and_counts() {
        let mut world = world_with(1, 3);
        let id = world.spawn_food(-50.0, 1e6, Some(0.0), None);
        let pellet = world.food.iter().find(|f| f.id == id).unwrap();
        assert_eq!(pellet.x, 0.0);
        assert_eq!(pellet.y, world.swim_height());
        assert_eq!(pellet.amount, world.config.food.min_amount);
        let second = world.spawn_food(10.0, 10.0, None, None);
        assert_eq!(second, id + 1);
    }

    #[test]
    fn test_consume_food_partial_then_full() {
        let mut world = world_with(1, 3);
        let id = world.spawn_food(100.0, 100.0, Some(1.0), None);
        let first = world.consume_food(id, 0.4);
        assert!((first - 0.4).abs() < 1e-12);
        assert_eq!(world.food.len(), 1);
        let second = world.consume_food(id, 5.0);
        assert!((second - 0.6).abs() < 1e-12);
        assert!(world.food.is_empty());
        assert_eq!(world.consume_food(id, 1.0), 0.0);
        assert_eq!(world.foods_consumed_count, 2);
    }

    #[test]
    fn test_unknown_ids_return_zero() {
        let mut world = world_with(1, 3);
        assert_eq!(world.consume_poop(42, None), 0.0);
        assert_eq!(world.consume_egg(42, None), 0.0);
        assert_eq!(world.consume_fruit(42), 0.0);
    }

    #[test]
    fn test_invisible_poop_only_dirties() {
        let mut world = world_with(1, 3);
        let spawn = PoopSpawn {
            bioload_factor: 0.25,
            visible: false,
        };
        assert_eq!(world.spawn_poop(10.0, 10.0, None, spawn), None);
        assert!(world.poop.is_empty());
        assert!(world.pending_poop_dirt01 > 0.0);
        assert!(world.water.hygiene01 < 1.0);
    }

    #[test]
    fn test_protected_eggs_cannot_be_eaten() {
        let mut world = world_with(1, 3);
        world.eggs.push(egg(1, true));
        world.eggs.push(egg(2, false));
        assert_eq!(world.consume_egg(1, Some(9)), 0.0);
        assert_eq!(world.consume_egg(2, Some(9)), 0.25);
        assert_eq!(world.eggs.len(), 1);
    }

    #[test]
    fn test_expired_food_hurts_water() {
        let mut world = world_with(1, 3);
        world.spawn_food(100.0, 100.0, None, Some(0.5));
        world.update_food(1.0);
        assert!(world.food.is_empty());
        assert_eq!(world.expired_food_since_water_update, 1);
        assert!((world.water.hygiene01 - 0.993).abs() < 1e-9);
    }

    #[test]
    fn test_food_settles_on_bottom() {
        let mut world = world_with(1, 3);
        world.spawn_food(100.0, world.swim_height() - 1.0, None, None);
        for _ in 0..20 {
            world.update_food(0.5);
        }
        assert_eq!(world.food[0].y, world.swim_height());
    }

    #[test]
    fn test_poop_sinks_and_dissolves() {
        let mut world = world_with(1, 3);
        world.spawn_poop(100.0, 10.0, Some(2.0), PoopSpawn::default());
        world.update_poop(1.0);
        assert!(world.poop[0].y > 10.0);
        let before = world.pending_poop_dirt01;
        world.update_poop(1.5);
        assert!(world.poop.is_empty());
        assert!(world.pending_poop_dirt01 > before);
    }

    #[test]
    fn test_schedule_poop_requires_live_fish() {
        let mut world = world_with(1, 3);
        let id = world.fish[0].id;
        assert!(world.schedule_poop_from_fish(id, 100.0));
        assert_eq!(world.scheduled_poop()[0].spawn_at_sec, 30.0);
        assert!(!world.schedule_poop_from_fish(999, 1.0));
    }

    #[test]
    fn test_fx_particles_expire() {
        let mut world = world_with(1, 3);
        world.spawn_mating_bubbles(Vec2::new(50.0, 50.0));
        assert_eq!(world.fx_particles.len(), 2);
        world.update_fx(1.0);
        assert!(world.fx_particles.is_empty());
    }
}
