use super::{NextIds, SpeciesUnlocks, World};
use crate::config::AppConfig;
use crate::fish::genetics::random_traits;
use crate::fish::lifecycle::{adult_start_age, update_life_cycle};
use crate::fish::{FishLogic, SpawnParams};
use crate::rng::{chance, range, shuffle};
use aquarium_data::{
    Bounds, Fish, GroundAlgae, LifeStage, Sex, SpeciesId, Traits, Vec2, WaterState,
};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// What the world decides about a fish before spawning it.
#[derive(Debug, Clone)]
pub struct NewFish {
    pub species_id: SpeciesId,
    /// Random when `None`.
    pub sex: Option<Sex>,
    pub initial_age_sec: f64,
    pub hungry_start: bool,
    /// Random non-overlapping spot when `None`.
    pub position: Option<Vec2>,
    pub traits: Option<Traits>,
    pub name: Option<String>,
    pub born_in_aquarium: bool,
    pub mother_id: Option<u64>,
    pub father_id: Option<u64>,
}

impl Default for NewFish {
    fn default() -> Self {
        Self {
            species_id: SpeciesId::LabMinnow,
            sex: None,
            initial_age_sec: 0.0,
            hungry_start: false,
            position: None,
            traits: None,
            name: None,
            born_in_aquarium: false,
            mother_id: None,
            father_id: None,
        }
    }
}

const SPAWN_RETRIES: usize = 20;

impl World {
    /// Builds a world from config, seeding ChaCha8 from `world.seed` when set.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let rng: Box<dyn RngCore + Send> = match config.world.seed {
            Some(seed) => Box::new(ChaCha8Rng::seed_from_u64(seed)),
            None => Box::new(ChaCha8Rng::from_entropy()),
        };
        Self::with_rng(config, rng)
    }

    /// Builds a world drawing every random decision from `rng`.
    #[must_use]
    pub fn with_rng(config: AppConfig, rng: Box<dyn RngCore + Send>) -> Self {
        let bounds = Bounds::new(config.world.width, config.world.height);
        let initial_fish_count = config.world.initial_fish_count.clamp(1, 6);
        let mut world = Self {
            bounds,
            sim_time_sec: 0.0,
            speed_multiplier: 1.0,
            paused: false,
            initial_fish_count,
            fish: Vec::new(),
            archive: BTreeMap::new(),
            food: Vec::new(),
            poop: Vec::new(),
            eggs: Vec::new(),
            berry_reed_plants: Vec::new(),
            fruits: Vec::new(),
            nestbrush: None,
            ground_algae: Vec::new(),
            fx_particles: Vec::new(),
            water: WaterState::default(),
            foods_consumed_count: 0,
            food_amount_consumed_total: 0.0,
            births_count: 0,
            eggs_laid_count: 0,
            deaths_count: 0,
            peak_population_count: 0,
            grandparent_ids: BTreeSet::new(),
            filter_unlocked: false,
            species_unlocks: SpeciesUnlocks::default(),
            expired_food_since_water_update: 0,
            pending_poop_dirt01: 0.0,
            next_ids: NextIds::default(),
            name_counts: HashMap::new(),
            mate_pair_next_try_at: HashMap::new(),
            scheduled_poop: Vec::new(),
            play_sessions: Vec::new(),
            events: Vec::new(),
            rng,
            config,
        };

        world.generate_initial_population(initial_fish_count);
        world.seed_ground_algae();
        world.refresh_species_unlocks();
        world.water.filter_unlocked = world.is_filter_unlocked();

        tracing::info!(
            seed = ?world.config.world.seed,
            width = world.bounds.width,
            height = world.bounds.height,
            fish = world.fish.len(),
            "World created"
        );
        world
    }

    fn spawn_margin(&self) -> f64 {
        (self.bounds.width.min(self.bounds.height) * 0.03).clamp(10.0, 20.0)
    }

    fn random_spawn_point(&mut self) -> Vec2 {
        let margin = self.spawn_margin();
        let rng = &mut *self.rng;
        Vec2::new(
            range(rng, margin, (self.bounds.width - margin).max(margin)),
            range(rng, margin, (self.bounds.swim_height() - margin).max(margin)),
        )
    }

    fn is_spawn_clear(&self, point: Vec2, radius: f64) -> bool {
        self.fish.iter().all(|other| {
            let min_dist = (radius * 1.5).max(other.size * 1.5);
            point.distance_to(other.position) >= min_dist
        })
    }

    /// Creates a fish with a fresh id and a unique name. The caller decides
    /// whether it joins the live roster.
    pub(crate) fn create_fish(&mut self, new_fish: NewFish) -> Fish {
        let traits = match new_fish.traits {
            Some(traits) => traits,
            None => {
                let species = self.config.species.get(new_fish.species_id);
                random_traits(species, &self.config, &mut *self.rng)
            }
        };
        let species_scale = self.config.species.get(new_fish.species_id).adult_size_scale;
        let birth_radius = self.config.growth.adult_radius
            * traits.size_factor
            * species_scale
            * self.config.growth.birth_scale;

        let position = match new_fish.position {
            Some(p) if p.x.is_finite() && p.y.is_finite() => p,
            _ => {
                let mut candidate = self.random_spawn_point();
                for _ in 0..SPAWN_RETRIES {
                    if self.is_spawn_clear(candidate, birth_radius) {
                        break;
                    }
                    candidate = self.random_spawn_point();
                }
                candidate
            }
        };
        let position = self.bounds.clamp_point(position);

        let jitter = self.config.age.stage_jitter_sec;
        let stage_shift_baby_sec = range(&mut *self.rng, -jitter, jitter);
        let stage_shift_juvenile_sec = range(&mut *self.rng, -jitter, jitter);
        let initial_age = new_fish
            .initial_age_sec
            .clamp(0.0, self.config.age.initial_max_age_sec);

        let sex = match new_fish.sex {
            Some(sex) => sex,
            None if chance(&mut *self.rng, 0.5) => Sex::Female,
            None => Sex::Male,
        };
        let unique = match new_fish.name.as_deref() {
            Some(desired) => self.make_unique_name(desired, None),
            None => None,
        };
        let name = match unique {
            Some(name) => name,
            None => self.assign_default_name(sex),
        };

        let id = self.next_ids.fish;
        self.next_ids.fish += 1;

        let params = SpawnParams {
            id,
            name,
            species_id: new_fish.species_id,
            sex,
            position,
            spawn_time_sec: self.sim_time_sec - initial_age,
            now_sec: self.sim_time_sec,
            traits,
            stage_shift_baby_sec,
            stage_shift_juvenile_sec,
            hunger01: if new_fish.hungry_start {
                self.config.hunger.initial_hunger
            } else {
                0.0
            },
            mother_id: new_fish.mother_id,
            father_id: new_fish.father_id,
            born_in_aquarium: new_fish.born_in_aquarium,
        };
        Fish::spawn(params, self.bounds, &self.config, &mut *self.rng)
    }

    fn generate_initial_population(&mut self, count: u32) {
        let count = count.clamp(1, 6);
        let females = count.div_ceil(2);
        let max_age = self.config.age.initial_max_age_sec;

        for i in 0..count {
            let sex = if i < females { Sex::Female } else { Sex::Male };
            let initial_age_sec = range(&mut *self.rng, 0.0, max_age);
            let fish = self.create_fish(NewFish {
                sex: Some(sex),
                initial_age_sec,
                hungry_start: true,
                ..NewFish::default()
            });
            self.fish.push(fish);
        }

        let has_mature_female = self.fish.iter().any(|f| {
            f.sex == Sex::Female && matches!(f.life_stage, LifeStage::Adult | LifeStage::Old)
        });
        if !has_mature_female {
            if let Some(index) = self.fish.iter().position(|f| f.sex == Sex::Female) {
                let adult_start = adult_start_age(&self.fish[index], &self.config);
                let age = if adult_start < max_age {
                    range(&mut *self.rng, adult_start, max_age)
                } else {
                    range(&mut *self.rng, 0.0, max_age)
                };
                let now = self.sim_time_sec;
                let fish = &mut self.fish[index];
                fish.spawn_time_sec = now - age;
                update_life_cycle(fish, now, &self.config);
            }
        }

        shuffle(&mut *self.rng, &mut self.fish);
        self.peak_population_count = self.fish.len() as u64;
    }

    pub(crate) fn seed_ground_algae(&mut self) {
        let w = self.bounds.width;
        let h = self.bounds.height;
        let count = self
            .config
            .world
            .algae_min_count
            .max((w / self.config.world.algae_spacing_px).floor() as usize);
        let radius = self.config.world.algae_radius;
        let rng = &mut *self.rng;
        self.ground_algae = (0..count)
            .map(|_| GroundAlgae {
                x: range(rng, 12.0, (w - 12.0).max(12.0)),
                y: h - range(rng, 1.0, 10.0),
                height: range(rng, h * 0.07, h * 0.16),
                radius: range(rng, radius[0], radius[1]),
            })
            .collect();
    }

    /// Resizes the tank, clamping every positioned entity into the new bounds.
    pub fn resize(&mut self, width: f64, height: f64) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return;
        }
        self.bounds = Bounds::new(width, height);
        let bounds = self.bounds;
        for fish in &mut self.fish {
            fish.position = bounds.clamp_point(fish.position);
        }
        for food in &mut self.food {
            let p = bounds.clamp_point(Vec2::new(food.x, food.y));
            food.x = p.x;
            food.y = p.y;
        }
        for poop in &mut self.poop {
            let p = bounds.clamp_point(Vec2::new(poop.x, poop.y));
            poop.x = p.x;
            poop.y = p.y;
        }
        for egg in &mut self.eggs {
            let p = bounds.clamp_point(Vec2::new(egg.x, egg.y));
            egg.x = p.x;
            egg.y = p.y;
        }
        let max_growth = self.config.fixtures.reed_max_growth_sec();
        for plant in &mut self.berry_reed_plants {
            super::fixtures::sanitize_reed(plant, bounds, max_growth);
        }
        self.seed_ground_algae();
    }

    /// Grows or shrinks the starting roster.
    pub fn set_fish_count(&mut self, count: u32) {
        let target = count.clamp(1, self.config.world.max_fish_count.max(1)) as usize;
        while self.fish.len() < target {
            let fish = self.create_fish(NewFish::default());
            self.fish.push(fish);
        }
        while self.fish.len() > target {
            let index = self.fish.len() - 1;
            self.retire_fish(index);
        }
        self.peak_population_count = self.peak_population_count.max(self.fish.len() as u64);
    }
}
