//! The aquarium world: owns every collection and sequences each tick.
//!
//! The tick itself lives in [`update`]; the remaining submodules each add one
//! slice of `impl World` (consumables, play sessions, reproduction, water,
//! fixtures, unlocks, names, persistence and reporting).

use crate::config::AppConfig;
use aquarium_data::{
    BerryReedPlant, Bounds, Egg, Fish, Food, Fruit, FxParticle, GroundAlgae, Nestbrush, Poop,
    WaterState, WorldEvent, WorldEventKind,
};
use rand::RngCore;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub mod consumables;
pub mod fixtures;
pub mod init;
pub mod naming;
pub mod persistence;
pub mod play;
pub mod report;
pub mod reproduction;
pub mod unlocks;
pub mod update;
pub mod water;

pub use consumables::PoopSpawn;
pub use play::PlaySession;

/// A poop owed by a fish that finished digesting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledPoop {
    pub fish_id: u64,
    pub spawn_at_sec: f64,
}

/// Latched species and plant unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeciesUnlocks {
    pub berry_reed: bool,
    pub azure_dart: bool,
    pub silt_sifter: bool,
}

/// Monotonic id sources, one per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NextIds {
    pub fish: u64,
    pub food: u64,
    pub poop: u64,
    pub egg: u64,
    pub play_session: u64,
    pub reed: u64,
    pub fruit: u64,
    pub nestbrush: u64,
}

impl Default for NextIds {
    fn default() -> Self {
        Self {
            fish: 1,
            food: 1,
            poop: 1,
            egg: 1,
            play_session: 1,
            reed: 1,
            fruit: 1,
            nestbrush: 1,
        }
    }
}

pub struct World {
    pub config: AppConfig,
    pub bounds: Bounds,
    pub sim_time_sec: f64,
    pub speed_multiplier: f64,
    pub paused: bool,
    pub initial_fish_count: u32,

    /// Live roster.
    pub fish: Vec<Fish>,
    /// Fish that left the live roster, keyed by id. Entries are never dropped.
    pub(crate) archive: BTreeMap<u64, Fish>,

    pub food: Vec<Food>,
    pub poop: Vec<Poop>,
    pub eggs: Vec<Egg>,
    pub berry_reed_plants: Vec<BerryReedPlant>,
    pub fruits: Vec<Fruit>,
    pub nestbrush: Option<Nestbrush>,
    pub ground_algae: Vec<GroundAlgae>,
    pub fx_particles: Vec<FxParticle>,
    pub water: WaterState,

    pub foods_consumed_count: u64,
    pub food_amount_consumed_total: f64,
    pub births_count: u64,
    pub eggs_laid_count: u64,
    pub deaths_count: u64,
    pub peak_population_count: u64,
    pub grandparent_ids: BTreeSet<u64>,

    pub(crate) filter_unlocked: bool,
    pub(crate) species_unlocks: SpeciesUnlocks,
    pub(crate) expired_food_since_water_update: u32,
    pub(crate) pending_poop_dirt01: f64,

    pub(crate) next_ids: NextIds,
    pub(crate) name_counts: HashMap<String, u32>,
    pub(crate) mate_pair_next_try_at: HashMap<(u64, u64), f64>,
    pub(crate) scheduled_poop: Vec<ScheduledPoop>,
    pub(crate) play_sessions: Vec<PlaySession>,
    pub(crate) events: Vec<WorldEvent>,
    pub(crate) rng: Box<dyn RngCore + Send>,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("bounds", &self.bounds)
            .field("sim_time_sec", &self.sim_time_sec)
            .field("speed_multiplier", &self.speed_multiplier)
            .field("paused", &self.paused)
            .field("fish", &self.fish.len())
            .field("archived", &self.archive.len())
            .field("food", &self.food.len())
            .field("poop", &self.poop.len())
            .field("eggs", &self.eggs.len())
            .finish_non_exhaustive()
    }
}

impl World {
    /// Replaces the random source. Stubbing it with
    /// [`FixedRng`](crate::rng::FixedRng) pins every stochastic gate.
    pub fn set_rng(&mut self, rng: Box<dyn RngCore + Send>) {
        self.rng = rng;
    }

    #[must_use]
    pub fn swim_height(&self) -> f64 {
        self.bounds.swim_height()
    }

    /// Live fish first, then the archive.
    #[must_use]
    pub fn fish_by_id(&self, id: u64) -> Option<&Fish> {
        self.fish
            .iter()
            .find(|f| f.id == id)
            .or_else(|| self.archive.get(&id))
    }

    pub(crate) fn fish_by_id_mut(&mut self, id: u64) -> Option<&mut Fish> {
        match self.fish.iter_mut().find(|f| f.id == id) {
            Some(fish) => Some(fish),
            None => self.archive.get_mut(&id),
        }
    }

    pub(crate) fn fish_index(&self, id: u64) -> Option<usize> {
        self.fish.iter().position(|f| f.id == id)
    }

    /// Fish that left the live roster.
    pub fn archived_fish(&self) -> impl Iterator<Item = &Fish> {
        self.archive.values()
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.fish.iter().filter(|f| f.is_alive()).count()
    }

    /// No fish left alive. The runner treats this as a terminal state.
    #[must_use]
    pub fn is_ecosystem_failed(&self) -> bool {
        self.alive_count() == 0
    }

    #[must_use]
    pub fn scheduled_poop(&self) -> &[ScheduledPoop] {
        &self.scheduled_poop
    }

    #[must_use]
    pub fn play_sessions(&self) -> &[PlaySession] {
        &self.play_sessions
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Drains events queued outside of `update`.
    pub fn flush_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, kind: WorldEventKind) {
        self.events.push(WorldEvent {
            t: self.sim_time_sec,
            kind,
        });
    }

    /// Moves a fish from the live roster into the archive.
    pub(crate) fn retire_fish(&mut self, index: usize) -> Option<u64> {
        if index >= self.fish.len() {
            return None;
        }
        let fish = self.fish.remove(index);
        let id = fish.id;
        self.archive.insert(id, fish);
        Some(id)
    }

    /// Removes a dead fish from the live roster. The archive keeps it.
    pub fn discard_fish(&mut self, fish_id: u64) -> bool {
        let Some(index) = self
            .fish
            .iter()
            .position(|f| f.id == fish_id && !f.is_alive())
        else {
            return false;
        };
        self.fish[index].corpse_removed = true;
        self.retire_fish(index);
        tracing::debug!(fish_id, "Corpse discarded");
        true
    }

    /// Same contract as [`World::discard_fish`].
    pub fn remove_corpse(&mut self, fish_id: u64) -> bool {
        self.discard_fish(fish_id)
    }
}

/// Two distinct mutable elements of one slice.
pub(crate) fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert!(i != j);
    if i < j {
        let (left, right) = items.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::World;
    use crate::config::AppConfig;

    /// Seeded world with `fish` starting fish and everything else default.
    pub fn world_with(fish: u32, seed: u64) -> World {
        let mut config = AppConfig::default();
        config.world.initial_fish_count = fish;
        config.world.seed = Some(seed);
        World::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::world_with;
    use super::*;

    #[test]
    fn test_pair_mut_both_orders() {
        let mut items = [1, 2, 3];
        {
            let (a, b) = pair_mut(&mut items, 0, 2);
            *a += 10;
            *b += 20;
        }
        let (c, d) = pair_mut(&mut items, 2, 1);
        assert_eq!(*c, 23);
        assert_eq!(*d, 2);
        assert_eq!(items[0], 11);
    }

    #[test]
    fn test_discard_only_dead_fish() {
        let mut world = world_with(2, 5);
        let id = world.fish[0].id;
        assert!(!world.discard_fish(id));
        crate::fish::lifecycle::mark_dead(
            &mut world.fish[0],
            aquarium_data::DeathReason::Starvation,
            0.0,
        );
        assert!(world.discard_fish(id));
        assert_eq!(world.fish.len(), 1);
        let archived = world.fish_by_id(id).unwrap();
        assert!(archived.corpse_removed);
    }

    #[test]
    fn test_toggle_pause() {
        let mut world = world_with(1, 1);
        assert!(world.toggle_pause());
        assert!(!world.toggle_pause());
    }
}
