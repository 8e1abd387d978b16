//! Mating, laying, clutches and hatching, throttled by population pressure.

use super::init::NewFish;
use super::{pair_mut, World};
use crate::config::AppConfig;
use crate::fish::genetics::inherit_traits;
use crate::fish::{hover, FishLogic};
use crate::geometry::clamp01;
use crate::rng::{int_inclusive, pick_index, range, range_of, unit};
use aquarium_data::{
    ClutchRule, Egg, EggState, Fish, HungerState, LifeStage, ReproPhase, SpeciesId, Vec2,
    WorldEventKind,
};
use rand::Rng;

/// Clutch size before population damping.
pub fn clutch_base_size<R: Rng + ?Sized>(rule: &ClutchRule, rng: &mut R) -> u32 {
    match rule {
        ClutchRule::Range { min, max } => {
            int_inclusive(rng, i64::from(*min), i64::from(*max)).max(0) as u32
        }
        ClutchRule::Choice { sizes } => {
            if sizes.is_empty() {
                1
            } else {
                sizes[pick_index(rng, sizes.len())]
            }
        }
        ClutchRule::Weighted { sizes, weights } => {
            let Some(&last) = sizes.last() else {
                return 1;
            };
            let total: f64 = weights.iter().take(sizes.len()).map(|w| w.max(0.0)).sum();
            if total <= 0.0 {
                return sizes[0];
            }
            let roll = unit(rng) * total;
            let mut acc = 0.0;
            for (size, weight) in sizes.iter().zip(weights) {
                acc += weight.max(0.0);
                if roll < acc {
                    return *size;
                }
            }
            last
        }
    }
}

fn is_mate_eligible(fish: &Fish, now: f64, hygiene01: f64, config: &AppConfig) -> bool {
    let r = &config.reproduction;
    fish.is_alive()
        && fish.life_stage == LifeStage::Adult
        && fish.hunger_state == HungerState::Fed
        && fish.wellbeing01 >= r.min_wellbeing
        && hygiene01 >= r.min_hygiene
        && fish.repro.state == ReproPhase::Ready
        && now >= fish.repro.cooldown_until_sec
}

fn ate_recently(at: Option<f64>, now: f64, window: f64) -> bool {
    at.is_some_and(|t| now - t <= window)
}

impl World {
    fn alive_of_species(&self, species: SpeciesId) -> usize {
        self.fish
            .iter()
            .filter(|f| f.is_alive() && f.species_id == species)
            .count()
    }

    /// Soft density signal in `[0, 1]` for one species.
    #[must_use]
    pub fn population_pressure(&self, species: SpeciesId) -> f64 {
        let count = self.alive_of_species(species) as f64;
        let start = self.config.pressure_start_count();
        let critical = self.config.pressure_critical_count();
        if count <= start {
            0.0
        } else {
            clamp01((count - start) / (critical - start).max(1.0))
        }
    }

    /// Fecundity multiplier for species stressed by a crowd of AZURE_DART.
    #[must_use]
    pub fn authority_stress_factor(&self) -> f64 {
        let p = &self.config.pressure;
        let azure = self.alive_of_species(SpeciesId::AzureDart) as f64;
        let delta = (azure - p.authority_start_count).max(0.0);
        if delta <= 0.0 {
            return 1.0;
        }
        let power = p.authority_curve_power.max(1.0);
        let half = p.authority_half_effect_delta.max(1.0);
        let curve = delta.powf(power) / (delta.powf(power) + half.powf(power));
        (1.0 - p.authority_max_penalty * curve).clamp(1.0 - p.authority_max_penalty, 1.0)
    }

    pub(crate) fn update_reproduction(&mut self) {
        let now = self.sim_time_sec;
        if self.config.reproduction.enabled {
            self.try_mating(now);
        }
        self.update_females(now);
    }

    fn try_mating(&mut self, now: f64) {
        let radius = self.config.reproduction.encounter_radius_px;
        let count = self.fish.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (a, b) = (&self.fish[i], &self.fish[j]);
                if !a.is_alive() || !b.is_alive() || a.position.distance_to(b.position) > radius {
                    continue;
                }
                self.try_mate_pair(i, j, now);
            }
        }
    }

    fn try_mate_pair(&mut self, i: usize, j: usize, now: f64) -> bool {
        let hygiene = self.water.hygiene01;
        let (a, b) = (&self.fish[i], &self.fish[j]);
        if a.sex == b.sex || a.species_id != b.species_id {
            return false;
        }
        if !is_mate_eligible(a, now, hygiene, &self.config)
            || !is_mate_eligible(b, now, hygiene, &self.config)
        {
            return false;
        }

        let species_id = a.species_id;
        let profile = self.config.species.get(species_id);
        if let Some(window) = profile.mate_requires_recent_poop_sec {
            let window = range_of(&mut *self.rng, window);
            if !ate_recently(a.last_poop_consumed_at_sec, now, window)
                || !ate_recently(b.last_poop_consumed_at_sec, now, window)
            {
                return false;
            }
        }

        let key = (a.id.min(b.id), a.id.max(b.id));
        if self
            .mate_pair_next_try_at
            .get(&key)
            .is_some_and(|&next| now < next)
        {
            return false;
        }
        self.mate_pair_next_try_at
            .insert(key, now + self.config.reproduction.pair_retry_sec);

        let r = &self.config.reproduction;
        let hygiene_factor =
            0.5 + 0.5 * clamp01((hygiene - r.min_hygiene) / (1.0 - r.min_hygiene).max(1e-6));
        let min_wellbeing = a.wellbeing01.min(b.wellbeing01);
        let wellbeing_factor = 0.6
            + 0.4 * clamp01((min_wellbeing - r.min_wellbeing) / (1.0 - r.min_wellbeing).max(1e-6));
        let density_factor = 1.0 - r.mate_pressure_damping * self.population_pressure(species_id);
        let authority_factor = if profile.authority_stressed {
            self.authority_stress_factor()
        } else {
            1.0
        };
        let egg_boost = profile.egg_mate_boost.as_ref().map_or(1.0, |boost| {
            if ate_recently(a.last_egg_consumed_at_sec, now, boost.window_sec)
                || ate_recently(b.last_egg_consumed_at_sec, now, boost.window_sec)
            {
                boost.multiplier
            } else {
                1.0
            }
        });
        let p = clamp01(
            r.base_chance * hygiene_factor * wellbeing_factor * density_factor * authority_factor
                * egg_boost,
        );
        if unit(&mut *self.rng) >= p {
            return false;
        }

        let scale = profile.reproduction_scale;
        let (female_index, male_index) = if a.is_female() { (i, j) } else { (j, i) };
        let gestation = range_of(&mut *self.rng, r.gestation_sec) * scale;
        let father_cooldown = range_of(&mut *self.rng, r.father_cooldown_sec) * scale;

        let (female, male) = pair_mut(&mut self.fish, female_index, male_index);
        let (female_id, male_id) = (female.id, male.id);
        female.repro.state = ReproPhase::Gravid;
        female.repro.father_id = Some(male_id);
        female.repro.pregnancy_start_sec = Some(now);
        female.repro.due_at_sec = Some(now + gestation);
        female.repro.laying_started_at_sec = None;
        female.repro.lay_target = None;
        male.repro.cooldown_until_sec = now + father_cooldown;

        for (fish, partner) in [(female, male_id), (male, female_id)] {
            fish.history.mate_count += 1;
            fish.start_mating_anim(partner, now, &self.config);
            hover::cancel(fish, now, &self.config, &mut *self.rng);
        }

        self.emit(WorldEventKind::Mated { female_id, male_id });
        tracing::debug!(female_id, male_id, species = species_id.as_str(), "Fish mated");
        true
    }

    fn lay_height(&self) -> f64 {
        (self.swim_height() - self.config.reproduction.lay_bottom_offset_px).max(0.0)
    }

    fn update_females(&mut self, now: f64) {
        for index in 0..self.fish.len() {
            let fish = &self.fish[index];
            if !fish.is_alive() || !fish.is_female() {
                continue;
            }
            match fish.repro.state {
                ReproPhase::Gravid => {
                    if fish.repro.due_at_sec.is_some_and(|due| now >= due) {
                        self.begin_laying(index, now);
                    }
                }
                ReproPhase::Laying => self.continue_laying(index, now),
                ReproPhase::Cooldown => {
                    if now >= fish.repro.cooldown_until_sec {
                        self.fish[index].repro.state = ReproPhase::Ready;
                    }
                }
                ReproPhase::Ready => {}
            }
        }
    }

    fn begin_laying(&mut self, index: usize, now: f64) {
        let lay_y = self.lay_height();
        let swim_h = self.swim_height();
        let r = &self.config.reproduction;
        let (lay_jitter, reed_jitter) = (r.lay_jitter_x_px, r.reed_jitter_x_px);
        let fish = &self.fish[index];
        let x = fish.position.x;
        let profile = self.config.species.get(fish.species_id);
        let nests = profile.nests_in_nestbrush;
        let reed = if profile.lays_near_reed {
            self.berry_reed_plants.first().map(|p| (p.x, p.bottom_y))
        } else {
            None
        };

        let mut use_nest = false;
        let target = if nests && self.nestbrush_available_slots() > 0 {
            use_nest = true;
            self.nest_lay_target()
        } else {
            None
        };
        let target = match (target, reed) {
            (Some(target), _) => target,
            (None, Some((reed_x, reed_bottom))) => {
                let rng = &mut *self.rng;
                Vec2::new(
                    reed_x + range(rng, -reed_jitter, reed_jitter),
                    (reed_bottom - range(rng, 1.0, 6.0)).clamp((lay_y - 6.0).max(0.0), swim_h),
                )
            }
            (None, None) => Vec2::new(x + range(&mut *self.rng, -lay_jitter, lay_jitter), lay_y),
        };
        let target = self.bounds.clamp_point(target);

        let fish = &mut self.fish[index];
        fish.repro.state = ReproPhase::Laying;
        fish.repro.lay_target = Some(target);
        fish.repro.lay_use_nestbrush = use_nest;
        fish.repro.laying_started_at_sec = Some(now);
    }

    fn continue_laying(&mut self, index: usize, now: f64) {
        let lay_y = self.lay_height();
        let r = &self.config.reproduction;
        let fish = &self.fish[index];
        let target = fish
            .repro
            .lay_target
            .unwrap_or(Vec2::new(fish.position.x, lay_y));
        let distance = fish.position.distance_to(target);
        if distance <= r.lay_reach_px && now >= fish.hover.until_sec {
            self.lay_clutch(index, now);
        } else if distance >= r.lay_cancel_px {
            hover::cancel(&mut self.fish[index], now, &self.config, &mut *self.rng);
        }
    }

    fn lay_clutch(&mut self, index: usize, now: f64) {
        let mother = &self.fish[index];
        let (mother_id, species_id, mother_pos, mother_traits) =
            (mother.id, mother.species_id, mother.position, mother.traits);
        let father_id = mother.repro.father_id;
        let wants_nest = mother.repro.lay_use_nestbrush;
        let profile = self.config.species.get(species_id);
        let clutch = profile.clutch.clone();
        let nests = profile.nests_in_nestbrush;
        let repro_scale = profile.reproduction_scale;
        let cooldown_scale = profile.cooldown_scale();
        let reed = if profile.lays_near_reed {
            self.berry_reed_plants.first().map(|p| (p.x, p.bottom_y))
        } else {
            None
        };

        let base = clutch_base_size(&clutch, &mut *self.rng);
        let damping = self.config.reproduction.clutch_pressure_damping;
        let pressure = self.population_pressure(species_id);
        let count = ((f64::from(base) * (1.0 - damping * pressure)).round() as u32).max(1);
        let use_nest = nests && wants_nest && self.nestbrush_available_slots() >= count as usize;

        let father_traits = father_id
            .and_then(|id| self.fish_by_id(id))
            .map_or(mother_traits, |f| f.traits);
        let lay_y = self.lay_height();
        let swim_h = self.swim_height();
        let r = self.config.reproduction.clone();

        for _ in 0..count {
            let nest_spot = if use_nest { self.place_nest_egg() } else { None };
            let (position, attachment) = match (nest_spot, reed) {
                (Some((attachment, position)), _) => (position, Some(attachment)),
                (None, Some((reed_x, reed_bottom))) => {
                    let rng = &mut *self.rng;
                    let p = Vec2::new(
                        reed_x + range(rng, -r.reed_jitter_x_px, r.reed_jitter_x_px),
                        (reed_bottom - range(rng, 1.0, 8.0)).clamp((lay_y - 6.0).max(0.0), swim_h),
                    );
                    (p, None)
                }
                (None, None) => {
                    let rng = &mut *self.rng;
                    let [jx, jy] = r.egg_jitter_px;
                    let p = Vec2::new(
                        mother_pos.x + range(rng, -jx, jx),
                        mother_pos.y + range(rng, -jy, jy),
                    );
                    (p, None)
                }
            };
            let protected = attachment.is_some();
            let incubation = range_of(&mut *self.rng, r.incubation_sec)
                * repro_scale
                * if protected { 1.0 } else { r.unprotected_incubation_multiplier };
            let position = self.bounds.clamp_point(position);

            let id = self.next_ids.egg;
            self.next_ids.egg += 1;
            self.eggs.push(Egg {
                id,
                x: position.x,
                y: position.y,
                laid_at_sec: now,
                hatch_at_sec: now + incubation,
                mother_id: Some(mother_id),
                father_id,
                mother_traits,
                father_traits,
                species_id,
                state: EggState::Incubating,
                can_be_eaten: true,
                nutrition: r.egg_nutrition,
                is_protected_by_nestbrush: protected,
                nestbrush_attachment: attachment,
            });
        }

        self.eggs_laid_count += u64::from(count);
        let cooldown = range_of(&mut *self.rng, r.mother_cooldown_sec) * cooldown_scale;
        let mother = &mut self.fish[index];
        mother.repro.state = ReproPhase::Cooldown;
        mother.repro.cooldown_until_sec = now + cooldown;
        mother.repro.clear_pregnancy();

        self.emit(WorldEventKind::ClutchLaid {
            mother_id,
            count,
            protected: use_nest,
        });
        tracing::info!(
            mother_id,
            count,
            protected = use_nest,
            species = species_id.as_str(),
            "Clutch laid"
        );
    }

    /// Odds that an egg hatches right now.
    #[must_use]
    pub fn hatch_chance(&self, egg: &Egg) -> f64 {
        let r = &self.config.reproduction;
        let profile = self.config.species.get(egg.species_id);
        let h = self.water.hygiene01;
        let mut p = if h >= r.min_hygiene {
            let t = clamp01((h - r.min_hygiene) / (1.0 - r.min_hygiene).max(1e-6));
            r.hatch_base_chance + r.hatch_hygiene_gain * t * t
        } else {
            0.0
        };
        p *= 1.0 - r.hatch_pressure_damping * self.population_pressure(egg.species_id);
        if !egg.is_protected_by_nestbrush {
            p *= profile.unprotected_hatch_multiplier;
        }
        if !self.berry_reed_plants.is_empty() {
            p += profile.reed_hatch_bonus;
        }
        clamp01(p)
    }

    /// Resolves every egg whose hatch time has come.
    pub(crate) fn update_eggs(&mut self) {
        let now = self.sim_time_sec;
        let (due, waiting): (Vec<Egg>, Vec<Egg>) = std::mem::take(&mut self.eggs)
            .into_iter()
            .partition(|e| e.state != EggState::Incubating || now >= e.hatch_at_sec);
        self.eggs = waiting;

        for egg in due.into_iter().filter(|e| e.state == EggState::Incubating) {
            let chance = self.hatch_chance(&egg);
            if unit(&mut *self.rng) < chance {
                self.hatch_egg(&egg);
            } else {
                self.emit(WorldEventKind::HatchFailed { egg_id: egg.id });
                tracing::debug!(egg_id = egg.id, "Egg failed to hatch");
            }
        }
    }

    fn hatch_egg(&mut self, egg: &Egg) {
        let traits = inherit_traits(
            &egg.mother_traits,
            &egg.father_traits,
            &self.config,
            &mut *self.rng,
        );
        let position = self.bounds.clamp_point(Vec2::new(egg.x, egg.y));
        let baby = self.create_fish(NewFish {
            species_id: egg.species_id,
            position: Some(position),
            traits: Some(traits),
            born_in_aquarium: true,
            mother_id: egg.mother_id,
            father_id: egg.father_id,
            ..NewFish::default()
        });
        let baby_id = baby.id;
        self.fish.push(baby);
        self.births_count += 1;
        self.peak_population_count = self.peak_population_count.max(self.fish.len() as u64);

        for parent_id in [egg.mother_id, egg.father_id].into_iter().flatten() {
            let Some(parent) = self.fish_by_id_mut(parent_id) else {
                continue;
            };
            if !parent.history.children_ids.contains(&baby_id) {
                parent.history.children_ids.push(baby_id);
            }
            let grandparents = [parent.history.mother_id, parent.history.father_id];
            self.grandparent_ids.extend(grandparents.into_iter().flatten());
        }

        self.emit(WorldEventKind::Hatched {
            egg_id: egg.id,
            fish_id: baby_id,
        });
        tracing::info!(
            egg_id = egg.id,
            fish_id = baby_id,
            births = self.births_count,
            "Egg hatched"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::world_with;
    use super::*;
    use crate::rng::FixedRng;
    use aquarium_data::{Sex, Traits};

    fn ready_pair(world: &mut World) {
        for (n, fish) in world.fish.iter_mut().take(2).enumerate() {
            fish.sex = if n == 0 { Sex::Female } else { Sex::Male };
            fish.life_stage = LifeStage::Adult;
            fish.hunger_state = HungerState::Fed;
            fish.wellbeing01 = 1.0;
            fish.repro = Default::default();
            fish.position = Vec2::new(300.0 + n as f64 * 20.0, 200.0);
        }
    }

    fn test_egg(id: u64, hatch_at_sec: f64) -> Egg {
        Egg {
            id,
            x: 100.0,
            y: 100.0,
            laid_at_sec: 0.0,
            hatch_at_sec,
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

    #[test]
    fn test_clutch_rules() {
        let range = ClutchRule::Range { min: 2, max: 4 };
        assert_eq!(clutch_base_size(&range, &mut FixedRng::new(0.0)), 2);
        assert_eq!(clutch_base_size(&range, &mut FixedRng::new(0.999)), 4);
        let choice = ClutchRule::Choice {
            sizes: vec![3, 4, 5],
        };
        assert_eq!(clutch_base_size(&choice, &mut FixedRng::new(0.5)), 4);
        let weighted = ClutchRule::Weighted {
            sizes: vec![1, 2, 3],
            weights: vec![0.45, 0.45, 0.1],
        };
        assert_eq!(clutch_base_size(&weighted, &mut FixedRng::new(0.0)), 1);
        assert_eq!(clutch_base_size(&weighted, &mut FixedRng::new(0.5)), 2);
        assert_eq!(clutch_base_size(&weighted, &mut FixedRng::new(0.95)), 3);
    }

    #[test]
    fn test_pressure_shape() {
        let mut world = world_with(1, 2);
        assert_eq!(world.population_pressure(SpeciesId::LabMinnow), 0.0);
        let template = world.fish[0].clone();
        for n in 0..40 {
            let mut fish = template.clone();
            fish.id = 100 + n;
            world.fish.push(fish);
        }
        assert_eq!(world.population_pressure(SpeciesId::LabMinnow), 1.0);
        assert_eq!(world.population_pressure(SpeciesId::AzureDart), 0.0);
    }

    #[test]
    fn test_authority_stress_curve() {
        let mut world = world_with(1, 2);
        assert_eq!(world.authority_stress_factor(), 1.0);
        let mut dart = world.fish[0].clone();
        dart.species_id = SpeciesId::AzureDart;
        for n in 0..12 {
            let mut fish = dart.clone();
            fish.id = 200 + n;
            world.fish.push(fish);
        }
        // delta = 6 sits on the half-effect point.
        assert!((world.authority_stress_factor() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_mating_makes_female_gravid() {
        let mut world = world_with(2, 4);
        ready_pair(&mut world);
        world.set_rng(Box::new(FixedRng::new(0.0)));
        world.update_reproduction();
        let female = &world.fish[0];
        assert_eq!(female.repro.state, ReproPhase::Gravid);
        assert_eq!(female.repro.father_id, Some(world.fish[1].id));
        assert_eq!(female.repro.due_at_sec, Some(450.0));
        assert_eq!(world.fish[1].repro.cooldown_until_sec, 120.0);
        assert_eq!(world.fish[1].history.mate_count, 1);
        assert!(world
            .flush_events()
            .iter()
            .any(|e| matches!(e.kind, WorldEventKind::Mated { .. })));
    }

    #[test]
    fn test_pair_retry_blocks_second_attempt() {
        let mut world = world_with(2, 4);
        ready_pair(&mut world);
        world.set_rng(Box::new(FixedRng::new(0.999)));
        world.update_reproduction();
        assert_eq!(world.fish[0].repro.state, ReproPhase::Ready);
        world.set_rng(Box::new(FixedRng::new(0.0)));
        world.sim_time_sec = 10.0;
        world.update_reproduction();
        assert_eq!(world.fish[0].repro.state, ReproPhase::Ready);
        world.sim_time_sec = 25.0;
        world.update_reproduction();
        assert_eq!(world.fish[0].repro.state, ReproPhase::Gravid);
    }

    #[test]
    fn test_dirty_water_blocks_mating() {
        let mut world = world_with(2, 4);
        ready_pair(&mut world);
        world.water.hygiene01 = 0.5;
        world.set_rng(Box::new(FixedRng::new(0.0)));
        world.update_reproduction();
        assert_eq!(world.fish[0].repro.state, ReproPhase::Ready);
    }

    #[test]
    fn test_laying_in_place_produces_clutch() {
        let mut world = world_with(1, 4);
        let here = world.fish[0].position;
        {
            let fish = &mut world.fish[0];
            fish.sex = Sex::Female;
            fish.repro.state = ReproPhase::Laying;
            fish.repro.lay_target = Some(here);
        }
        world.set_rng(Box::new(FixedRng::new(0.0)));
        world.update_reproduction();
        assert_eq!(world.eggs.len(), 2);
        assert_eq!(world.eggs_laid_count, 2);
        let mother = &world.fish[0];
        assert_eq!(mother.repro.state, ReproPhase::Cooldown);
        assert_eq!(mother.repro.lay_target, None);
        let egg = &world.eggs[0];
        assert_eq!(egg.mother_id, Some(mother.id));
        assert!((egg.hatch_at_sec - 180.0 * 1.18).abs() < 1e-9);
    }

    #[test]
    fn test_hatch_chance_follows_hygiene() {
        let mut world = world_with(1, 4);
        let egg = test_egg(1, 0.0);
        world.water.hygiene01 = 1.0;
        assert!((world.hatch_chance(&egg) - 0.86).abs() < 1e-9);
        world.water.hygiene01 = 0.5;
        assert_eq!(world.hatch_chance(&egg), 0.0);
    }

    #[test]
    fn test_hatching_links_family() {
        let mut world = world_with(2, 4);
        let mother_id = world.fish[0].id;
        let father_id = world.fish[1].id;
        world.fish[0].history.mother_id = Some(77);
        let mut egg = test_egg(1, 0.0);
        egg.mother_id = Some(mother_id);
        egg.father_id = Some(father_id);
        world.eggs.push(egg);
        world.eggs.push(test_egg(2, 1e9));
        world.set_rng(Box::new(FixedRng::new(0.0)));
        world.update_eggs();

        assert_eq!(world.eggs.len(), 1);
        assert_eq!(world.births_count, 1);
        let baby = world.fish.last().unwrap();
        assert!(baby.history.born_in_aquarium);
        assert_eq!(baby.history.mother_id, Some(mother_id));
        assert!(world.fish[0].history.children_ids.contains(&baby.id));
        assert!(world.fish[1].history.children_ids.contains(&baby.id));
        assert!(world.grandparent_ids.contains(&77));
    }

    #[test]
    fn test_failed_hatch_destroys_egg() {
        let mut world = world_with(1, 4);
        world.water.hygiene01 = 0.3;
        world.eggs.push(test_egg(1, 0.0));
        world.update_eggs();
        assert!(world.eggs.is_empty());
        assert_eq!(world.births_count, 0);
        assert!(world
            .flush_events()
            .iter()
            .any(|e| e.kind == WorldEventKind::HatchFailed { egg_id: 1 }));
    }
}

#[cfg(test)]
mod proptests {
    use super::super::test_support::world_with;
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_range_clutch_stays_in_bounds(seed in any::<u64>(), min in 0u32..6, span in 0u32..6) {
            let rule = ClutchRule::Range { min, max: min + span };
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let size = clutch_base_size(&rule, &mut rng);
            prop_assert!(size >= min && size <= min + span);
        }

        #[test]
        fn prop_weighted_clutch_picks_a_listed_size(
            seed in any::<u64>(),
            weights in prop::collection::vec(0.0f64..1.0, 3),
        ) {
            let sizes = vec![1, 2, 3];
            let rule = ClutchRule::Weighted { sizes: sizes.clone(), weights };
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            prop_assert!(sizes.contains(&clutch_base_size(&rule, &mut rng)));
        }

        #[test]
        fn prop_pressure_is_bounded_and_monotonic(extra in 0usize..60) {
            let mut world = world_with(1, 3);
            let template = world.fish[0].clone();
            let mut last = world.population_pressure(template.species_id);
            for i in 0..extra {
                let mut fish = template.clone();
                fish.id = 1000 + i as u64;
                world.fish.push(fish);
                let pressure = world.population_pressure(template.species_id);
                prop_assert!((0.0..=1.0).contains(&pressure));
                prop_assert!(pressure >= last);
                last = pressure;
            }
        }
    }
}
