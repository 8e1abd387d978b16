//! Nestbrush and berry reed: placement, growth, geometry and fruiting.

use super::World;
use crate::geometry::clamp01;
use crate::rng::{pick_index, range, range_of};
use crate::snapshot::FruitSpot;
use aquarium_data::{
    ActionFailure, ActionResult, BerryBranch, BerryReedPlant, Bounds, EggState, Feature, Fruit,
    Nestbrush, NestbrushAttachment, Vec2,
};
use std::f64::consts::TAU;

const FIXTURE_EDGE_PX: f64 = 14.0;

/// One nestbrush branch in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchPose {
    pub start: Vec2,
    pub end: Vec2,
}

/// Keeps a loaded or resized reed inside the tank and its growth consistent.
pub(crate) fn sanitize_reed(plant: &mut BerryReedPlant, bounds: Bounds, max_growth_sec: f64) {
    let h = bounds.swim_height();
    let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };

    plant.x = finite_or(plant.x, bounds.width * 0.5).clamp(0.0, bounds.width.max(0.0));
    plant.bottom_y = finite_or(plant.bottom_y, h).clamp(0.0, h);
    plant.max_height = finite_or(plant.max_height, h * 0.24).clamp(h * 0.14, h * 0.35);
    plant.spawn_height = finite_or(plant.spawn_height, plant.max_height * 0.6)
        .clamp(h * 0.1, plant.max_height);
    plant.growth_elapsed_sec = finite_or(plant.growth_elapsed_sec, 0.0).clamp(0.0, max_growth_sec);
    plant.height = plant.spawn_height
        + (plant.max_height - plant.spawn_height) * plant.growth_elapsed_sec / max_growth_sec.max(1.0);
    plant.sway_phase = finite_or(plant.sway_phase, 0.0);
    plant.sway_rate = finite_or(plant.sway_rate, 0.0012);
    plant.next_fruit_at_sec = plant.next_fruit_at_sec.filter(|t| t.is_finite());
    for branch in &mut plant.branches {
        branch.t = clamp01(finite_or(branch.t, 0.5));
        branch.side = if branch.side < 0.0 { -1.0 } else { 1.0 };
        branch.len = finite_or(branch.len, 0.3).clamp(0.05, 1.0);
    }
}

/// Four alternating branches spaced up the stem.
pub(crate) fn reed_branches<R: rand::Rng + ?Sized>(rng: &mut R) -> Vec<BerryBranch> {
    (0..4)
        .map(|i| BerryBranch {
            t: 0.24 + 0.18 * f64::from(i) + range(rng, -0.04, 0.04),
            side: if i % 2 == 0 { -1.0 } else { 1.0 },
            len: range(rng, 0.2, 0.38),
        })
        .collect()
}

fn bounds_ready(bounds: Bounds) -> bool {
    bounds.width.is_finite() && bounds.height.is_finite() && bounds.width > 0.0 && bounds.height > 0.0
}

impl World {
    // Nestbrush

    /// Places the single nestbrush on the side away from the reed.
    pub fn add_nestbrush(&mut self) -> ActionResult {
        if !self.is_feature_unlocked(Feature::Nestbrush) {
            return Err(ActionFailure::Locked);
        }
        if self.nestbrush.is_some() {
            return Err(ActionFailure::MaxCount);
        }
        if !bounds_ready(self.bounds) {
            return Err(ActionFailure::WorldNotReady);
        }

        let w = self.bounds.width;
        let h = self.swim_height();
        let reed_x = if self.berry_reed_plants.is_empty() {
            w * 0.5
        } else {
            self.berry_reed_plants.iter().map(|p| p.x).sum::<f64>() / self.berry_reed_plants.len() as f64
        };
        let anchor = if reed_x < w * 0.5 { 0.78 } else { 0.22 };

        let rng = &mut *self.rng;
        let x = (w * anchor + range(rng, -0.1, 0.1) * w)
            .clamp(FIXTURE_EDGE_PX, (w - FIXTURE_EDGE_PX).max(FIXTURE_EDGE_PX));
        let nestbrush = Nestbrush {
            id: self.next_ids.nestbrush,
            x,
            bottom_y: h - range(rng, 0.4, 1.6),
            height: range(rng, h * 0.09, h * 0.13),
            stage: 1,
            growth_progress_sec: 0.0,
            sway_phase: range(rng, 0.0, TAU),
            sway_rate: range(rng, 0.0007, 0.0014),
        };
        self.next_ids.nestbrush += 1;
        tracing::info!(x = nestbrush.x, "Nestbrush placed");
        self.nestbrush = Some(nestbrush);
        Ok(())
    }

    /// Protected-egg slots at the current stage, `0` without a nestbrush.
    #[must_use]
    pub fn nestbrush_capacity(&self) -> usize {
        let Some(nest) = &self.nestbrush else {
            return 0;
        };
        let caps = self.config.fixtures.nestbrush_capacity_by_stage;
        caps[usize::from(nest.stage.clamp(1, 3)) - 1]
    }

    #[must_use]
    pub fn nestbrush_available_slots(&self) -> usize {
        let used = self
            .eggs
            .iter()
            .filter(|e| e.state == EggState::Incubating && e.is_protected_by_nestbrush)
            .count();
        self.nestbrush_capacity().saturating_sub(used)
    }

    fn nestbrush_branch_count(stage: u8) -> usize {
        5 + 2 * (usize::from(stage.clamp(1, 3)) - 1)
    }

    /// World-space pose of a branch, swaying with sim time.
    #[must_use]
    pub fn nestbrush_branch_pose(&self, branch_index: usize) -> Option<BranchPose> {
        let nest = self.nestbrush.as_ref()?;
        let stage = f64::from(nest.stage.clamp(1, 3));
        let count = Self::nestbrush_branch_count(nest.stage);
        let i = branch_index % count;
        let fi = i as f64;
        let side = if i % 2 == 0 { -1.0 } else { 1.0 };
        let tier = (i / 2) as f64;
        let t = self.sim_time_sec;

        let spread_x = 14.0 + 11.0 * (stage - 1.0);
        let spread_y = nest.height * (0.18 + 0.05 * (stage - 1.0));
        let sway = (t * nest.sway_rate + nest.sway_phase).sin() * 4.0;
        let local = (t * nest.sway_rate * 2.4 + fi * 0.9).sin() * 1.7;

        let center_y = nest.bottom_y - nest.height * 0.38;
        let lane_y = (tier - (count as f64 - 1.0) * 0.25) * spread_y / (count as f64 * 0.5).max(1.0);
        let start = Vec2::new(
            nest.x + side * spread_x * 0.18 + sway * 0.45,
            center_y + lane_y,
        );
        let len = spread_x * (0.55 + ((i / 2) % 3) as f64 * 0.12);
        let end = Vec2::new(
            start.x + side * len + local,
            start.y + (fi * 1.17 + stage * 0.8).sin() * 0.9 - nest.height * 0.02,
        );
        Some(BranchPose { start, end })
    }

    /// Where an egg attached at `attachment` sits right now.
    #[must_use]
    pub fn nest_attachment_position(&self, attachment: NestbrushAttachment) -> Option<Vec2> {
        let pose = self.nestbrush_branch_pose(attachment.branch_index)?;
        let u = attachment.u.clamp(0.1, 0.95);
        let v = attachment.v.clamp(-8.0, 8.0);
        let dx = pose.end.x - pose.start.x;
        let dy = pose.end.y - pose.start.y;
        let angle = dy.atan2(dx);
        let base = Vec2::new(pose.start.x + dx * u, pose.start.y + dy * u);
        Some(self.bounds.clamp_point(Vec2::new(
            base.x - angle.sin() * v,
            base.y + angle.cos() * v,
        )))
    }

    /// Picks a fresh attachment point and its position.
    pub(crate) fn place_nest_egg(&mut self) -> Option<(NestbrushAttachment, Vec2)> {
        let stage = self.nestbrush.as_ref()?.stage;
        let rng = &mut *self.rng;
        let attachment = NestbrushAttachment {
            branch_index: pick_index(rng, Self::nestbrush_branch_count(stage)),
            u: range(rng, 0.34, 0.92),
            v: range(rng, -4.0, 4.0),
        };
        let position = self.nest_attachment_position(attachment)?;
        Some((attachment, position))
    }

    /// Where a nesting female heads to lay.
    pub(crate) fn nest_lay_target(&mut self) -> Option<Vec2> {
        if let Some((_, position)) = self.place_nest_egg() {
            return Some(position);
        }
        self.nestbrush
            .as_ref()
            .map(|n| self.bounds.clamp_point(Vec2::new(n.x, n.bottom_y - n.height * 0.45)))
    }

    pub(crate) fn update_nestbrush(&mut self, dt: f64) {
        let cfg = &self.config.fixtures;
        let hygiene = self.water.hygiene01;
        let Some(nest) = self.nestbrush.as_mut() else {
            return;
        };
        let max_stage = cfg.nestbrush_max_stage.clamp(1, 3);
        let period = cfg.nestbrush_stage_growth_sec;
        if nest.stage >= max_stage {
            nest.growth_progress_sec = nest.growth_progress_sec.min(period);
            return;
        }
        if hygiene < cfg.nestbrush_growth_min_hygiene01 {
            return;
        }
        nest.growth_progress_sec += dt;
        while nest.growth_progress_sec >= period && nest.stage < max_stage {
            nest.growth_progress_sec -= period;
            nest.stage += 1;
            tracing::info!(stage = nest.stage, "Nestbrush grew");
        }
        if nest.stage >= max_stage {
            nest.growth_progress_sec = nest.growth_progress_sec.min(period);
        }
    }

    // Berry reed

    pub fn add_berry_reed_plant(&mut self) -> ActionResult {
        if !self.is_feature_unlocked(Feature::BerryReed) {
            return Err(ActionFailure::Locked);
        }
        if self.berry_reed_plants.len() >= self.config.fixtures.reed_max_count {
            return Err(ActionFailure::MaxCount);
        }
        if !bounds_ready(self.bounds) || self.bounds.width < 20.0 || self.bounds.height < 20.0 {
            return Err(ActionFailure::WorldNotReady);
        }

        let w = self.bounds.width;
        let h = self.swim_height();
        let scale = self.config.fixtures.reed_spawn_height_scale;
        let rng = &mut *self.rng;

        let x = (w * 0.5 + range(rng, -0.12, 0.12) * w)
            .clamp(FIXTURE_EDGE_PX, (w - FIXTURE_EDGE_PX).max(FIXTURE_EDGE_PX));
        let max_height = range(rng, h * 0.2, h * 0.28);
        let spawn_height = max_height * range_of(rng, scale);
        let bottom_y = h - range(rng, 2.0, 6.0);
        let sway_phase = range(rng, 0.0, TAU);
        let sway_rate = range(rng, 0.0009, 0.0017);
        let branches = reed_branches(rng);

        let mut plant = BerryReedPlant {
            id: self.next_ids.reed,
            x,
            bottom_y,
            height: spawn_height,
            spawn_height,
            max_height,
            sway_phase,
            sway_rate,
            branches,
            next_fruit_at_sec: None,
            growth_elapsed_sec: 0.0,
        };
        self.next_ids.reed += 1;
        plant.next_fruit_at_sec = self
            .reed_fruit_interval(&plant)
            .map(|interval| self.sim_time_sec + interval);
        tracing::info!(plant_id = plant.id, x = plant.x, "Berry reed planted");
        self.berry_reed_plants.push(plant);
        Ok(())
    }

    fn reed_growth_multiplier(&self) -> f64 {
        let min = self.config.fixtures.reed_growth_min_hygiene01;
        let h = self.water.hygiene01;
        if h < min {
            0.0
        } else {
            clamp01((h - min) / (1.0 - min).max(1e-6))
        }
    }

    /// Fruit the plant can carry at its current growth.
    #[must_use]
    pub fn reed_fruit_capacity(&self, plant: &BerryReedPlant) -> f64 {
        let cfg = &self.config.fixtures;
        let caps = cfg.reed_capacity;
        let phase = plant
            .growth_elapsed_sec
            .clamp(0.0, cfg.reed_max_growth_sec())
            / cfg.reed_growth_reference_sec;
        if phase <= 1.0 {
            caps[0] + (caps[1] - caps[0]) * phase
        } else {
            caps[1] + (caps[2] - caps[1]) * (phase - 1.0)
        }
    }

    /// Seconds until the next fruit, `None` while hygiene is too poor.
    fn reed_fruit_interval(&self, plant: &BerryReedPlant) -> Option<f64> {
        let cfg = &self.config.fixtures;
        let h = self.water.hygiene01;
        if h < cfg.reed_growth_min_hygiene01 {
            return None;
        }
        let t = clamp01((h - cfg.reed_growth_min_hygiene01) / (1.0 - cfg.reed_growth_min_hygiene01).max(1e-6));
        let scale = cfg.reed_capacity[0] / self.reed_fruit_capacity(plant).max(1.0);
        let fastest = cfg.reed_fruit_interval_sec[0] * scale;
        let slowest = cfg.reed_fruit_interval_sec[1] * scale;
        Some(slowest - (slowest - fastest) * t)
    }

    /// World position of a fruit on its branch.
    #[must_use]
    pub fn fruit_world_position(&self, fruit: &Fruit) -> Option<Vec2> {
        let plant = self.berry_reed_plants.iter().find(|p| p.id == fruit.plant_id)?;
        let branch = plant.branches.get(fruit.branch_index)?;
        let h = plant.height;
        let sway = (self.sim_time_sec * plant.sway_rate + plant.sway_phase).sin();
        let stem_x = plant.x + sway * 8.0;
        let bx = stem_x + branch.side * h * branch.len * 0.45;
        let by = plant.bottom_y - h * branch.t;
        let tip_x = bx + branch.side * h * branch.len * 0.52;
        let tip_y = by - h * branch.len * 0.28;
        let u = clamp01(fruit.u);
        Some(self.bounds.clamp_point(Vec2::new(
            bx + (tip_x - bx) * u,
            by + (tip_y - by) * u + fruit.v,
        )))
    }

    pub(crate) fn fruit_position(&self, fruit_id: u64) -> Option<Vec2> {
        let fruit = self.fruits.iter().find(|f| f.id == fruit_id)?;
        self.fruit_world_position(fruit)
    }

    /// Positions of every hanging fruit.
    #[must_use]
    pub fn fruit_spots(&self) -> Vec<FruitSpot> {
        self.fruits
            .iter()
            .filter_map(|fruit| {
                self.fruit_world_position(fruit).map(|position| FruitSpot {
                    id: fruit.id,
                    position,
                })
            })
            .collect()
    }

    fn spawn_fruit(&mut self, plant_index: usize) -> bool {
        let cfg = &self.config.fixtures;
        let Some(plant) = self.berry_reed_plants.get(plant_index) else {
            return false;
        };
        let on_plant = self.fruits.iter().filter(|f| f.plant_id == plant.id).count();
        if on_plant >= cfg.reed_max_fruits_per_plant
            || self.fruits.len() >= cfg.reed_max_fruits
            || plant.branches.is_empty()
        {
            return false;
        }
        let rng = &mut *self.rng;
        let fruit = Fruit {
            id: self.next_ids.fruit,
            plant_id: plant.id,
            branch_index: pick_index(rng, plant.branches.len()),
            u: range(rng, 0.75, 1.0),
            v: range(rng, -3.0, 3.0),
            radius: range(rng, 1.8, 3.0),
            created_at_sec: self.sim_time_sec,
            ttl_sec: cfg.reed_fruit_ttl_sec,
        };
        self.next_ids.fruit += 1;
        self.fruits.push(fruit);
        true
    }

    pub(crate) fn update_berry_reeds(&mut self, dt: f64) {
        if self.berry_reed_plants.is_empty() {
            self.fruits.clear();
            return;
        }
        let now = self.sim_time_sec;
        self.fruits.retain(|f| now - f.created_at_sec < f.ttl_sec);

        let bounds = self.bounds;
        let max_growth = self.config.fixtures.reed_max_growth_sec();
        let growth = self.reed_growth_multiplier();
        let jitter = self.config.fixtures.reed_fruit_jitter_sec;
        let min_interval = self.config.fixtures.reed_min_fruit_interval_sec;

        for index in 0..self.berry_reed_plants.len() {
            let plant = &mut self.berry_reed_plants[index];
            sanitize_reed(plant, bounds, max_growth);
            plant.growth_elapsed_sec = (plant.growth_elapsed_sec + dt * growth).clamp(0.0, max_growth);
            plant.height = plant.spawn_height
                + (plant.max_height - plant.spawn_height) * plant.growth_elapsed_sec / max_growth.max(1.0);

            match plant.next_fruit_at_sec {
                None => {
                    let resume = self.reed_fruit_interval(&self.berry_reed_plants[index]);
                    self.berry_reed_plants[index].next_fruit_at_sec = resume.map(|i| now + i);
                    continue;
                }
                Some(at) if now < at => continue,
                Some(_) => {}
            }

            let spawned = self.spawn_fruit(index);
            let next = self
                .reed_fruit_interval(&self.berry_reed_plants[index])
                .map(|base| now + (base + range(&mut *self.rng, -jitter, jitter)).max(min_interval));
            self.berry_reed_plants[index].next_fruit_at_sec = next;
            if !spawned && self.fruits.len() >= self.config.fixtures.reed_max_fruits {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::world_with;
    use super::*;

    fn dev_world() -> World {
        let mut world = world_with(2, 21);
        world.config.world.dev_mode = true;
        world
    }

    #[test]
    fn test_nestbrush_is_locked_then_single() {
        let mut world = world_with(2, 21);
        assert_eq!(world.add_nestbrush(), Err(ActionFailure::Locked));
        world.births_count = 3;
        assert_eq!(world.add_nestbrush(), Ok(()));
        assert_eq!(world.add_nestbrush(), Err(ActionFailure::MaxCount));
        assert_eq!(world.nestbrush_capacity(), 4);
    }

    #[test]
    fn test_nestbrush_grows_only_in_clean_water() {
        let mut world = dev_world();
        world.add_nestbrush().unwrap();
        world.water.hygiene01 = 0.5;
        world.update_nestbrush(10_000.0);
        assert_eq!(world.nestbrush.as_ref().unwrap().stage, 1);
        world.water.hygiene01 = 1.0;
        world.update_nestbrush(800.0);
        assert_eq!(world.nestbrush.as_ref().unwrap().stage, 2);
        world.update_nestbrush(10_000.0);
        let nest = world.nestbrush.as_ref().unwrap();
        assert_eq!(nest.stage, 3);
        assert!(nest.growth_progress_sec <= 720.0);
        assert_eq!(world.nestbrush_capacity(), 12);
    }

    #[test]
    fn test_nest_attachment_stays_near_brush() {
        let mut world = dev_world();
        world.add_nestbrush().unwrap();
        let (_, position) = world.place_nest_egg().unwrap();
        let nest = world.nestbrush.as_ref().unwrap();
        assert!((position.x - nest.x).abs() < 40.0);
        assert!(position.y <= nest.bottom_y);
    }

    #[test]
    fn test_reed_capacity_grows_in_two_phases() {
        let mut world = dev_world();
        world.add_berry_reed_plant().unwrap();
        let mut plant = world.berry_reed_plants[0].clone();
        assert_eq!(world.reed_fruit_capacity(&plant), 4.0);
        plant.growth_elapsed_sec = 3000.0;
        assert_eq!(world.reed_fruit_capacity(&plant), 6.0);
        plant.growth_elapsed_sec = 6000.0;
        assert_eq!(world.reed_fruit_capacity(&plant), 12.0);
    }

    #[test]
    fn test_reed_fruiting_stops_in_dirty_water() {
        let mut world = dev_world();
        world.add_berry_reed_plant().unwrap();
        world.water.hygiene01 = 1.0;
        let interval = world.reed_fruit_interval(&world.berry_reed_plants[0]);
        assert_eq!(interval, Some(16.0));
        world.water.hygiene01 = 0.3;
        assert_eq!(world.reed_fruit_interval(&world.berry_reed_plants[0]), None);
    }

    #[test]
    fn test_reed_spawns_fruit_over_time() {
        let mut world = dev_world();
        world.add_berry_reed_plant().unwrap();
        assert_eq!(world.add_berry_reed_plant(), Err(ActionFailure::MaxCount));
        for _ in 0..200 {
            world.sim_time_sec += 1.0;
            world.update_berry_reeds(1.0);
        }
        assert!(!world.fruits.is_empty());
        assert!(world.fruits.len() <= 24);
        let spots = world.fruit_spots();
        assert_eq!(spots.len(), world.fruits.len());
    }

    #[test]
    fn test_sanitize_reed_repairs_nonsense() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut plant = BerryReedPlant {
            id: 1,
            x: f64::NAN,
            bottom_y: 1e9,
            height: 0.0,
            spawn_height: 1e9,
            max_height: -5.0,
            sway_phase: 0.0,
            sway_rate: f64::INFINITY,
            branches: vec![],
            next_fruit_at_sec: Some(f64::NAN),
            growth_elapsed_sec: -3.0,
        };
        sanitize_reed(&mut plant, bounds, 6000.0);
        assert_eq!(plant.x, 400.0);
        assert_eq!(plant.bottom_y, 600.0);
        assert_eq!(plant.max_height, 600.0 * 0.14);
        assert_eq!(plant.spawn_height, plant.max_height);
        assert_eq!(plant.growth_elapsed_sec, 0.0);
        assert_eq!(plant.next_fruit_at_sec, None);
    }
}
