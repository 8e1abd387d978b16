pub mod behavior;
pub mod genetics;
pub mod hover;
pub mod lifecycle;
pub mod metabolism;
pub mod play;
pub mod render;
pub mod spawn;
pub mod steering;

pub use aquarium_data::Fish;
pub use play::PlayAssignment;
pub use render::{HeadingPose, RenderParams};
pub use spawn::SpawnParams;
pub use steering::SteeringOutcome;

use crate::config::AppConfig;
use crate::snapshot::{FishContext, FishSnapshot};
use aquarium_data::{Bounds, DeathReason, MatingAnim, Vec2};
use rand::Rng;

/// Behaviour of a single fish. The world drives these calls in tick order.
pub trait FishLogic {
    fn spawn<R: Rng + ?Sized>(
        params: SpawnParams,
        bounds: Bounds,
        config: &AppConfig,
        rng: &mut R,
    ) -> Self
    where
        Self: Sized;

    /// Returns the death reason when the fish died of old age in this call.
    fn update_life_cycle(&mut self, now_sec: f64, config: &AppConfig) -> Option<DeathReason>;

    /// Returns the death reason when the fish starved in this call.
    fn update_metabolism(
        &mut self,
        dt: f64,
        now_sec: f64,
        hygiene01: f64,
        config: &AppConfig,
    ) -> Option<DeathReason>;

    fn decide_behavior<R: Rng + ?Sized>(&mut self, ctx: &FishContext<'_>, rng: &mut R);

    fn apply_steering<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        ctx: &FishContext<'_>,
        rng: &mut R,
    ) -> SteeringOutcome;

    fn eat(&mut self, amount: f64, config: &AppConfig);

    /// Whether `target` is within biting distance of the head or body.
    #[must_use]
    fn can_reach(&self, target: Vec2, bounds: Bounds, config: &AppConfig) -> bool;

    fn start_mating_anim(&mut self, partner_id: u64, now_sec: f64, config: &AppConfig);

    #[must_use]
    fn base_speed(&self, config: &AppConfig) -> f64;
    #[must_use]
    fn snapshot(&self) -> FishSnapshot;
    #[must_use]
    fn head_point(&self) -> Vec2;
    #[must_use]
    fn heading(&self, config: &AppConfig) -> HeadingPose;
    #[must_use]
    fn render_params(&self, config: &AppConfig) -> RenderParams;
    #[must_use]
    fn mouth_open01(&self) -> f64;
    #[must_use]
    fn is_hovering(&self, now_sec: f64) -> bool;
    #[must_use]
    fn pregnancy_swell01(&self, now_sec: f64) -> f64;
    #[must_use]
    fn life_stage_label(&self) -> &'static str;
}

impl FishLogic for Fish {
    fn spawn<R: Rng + ?Sized>(
        params: SpawnParams,
        bounds: Bounds,
        config: &AppConfig,
        rng: &mut R,
    ) -> Self {
        spawn::spawn_fish(params, bounds, config, rng)
    }

    fn update_life_cycle(&mut self, now_sec: f64, config: &AppConfig) -> Option<DeathReason> {
        lifecycle::update_life_cycle(self, now_sec, config)
    }

    fn update_metabolism(
        &mut self,
        dt: f64,
        now_sec: f64,
        hygiene01: f64,
        config: &AppConfig,
    ) -> Option<DeathReason> {
        metabolism::update_metabolism(self, dt, now_sec, hygiene01, config)
    }

    fn decide_behavior<R: Rng + ?Sized>(&mut self, ctx: &FishContext<'_>, rng: &mut R) {
        behavior::decide_behavior(self, ctx, rng);
    }

    fn apply_steering<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        ctx: &FishContext<'_>,
        rng: &mut R,
    ) -> SteeringOutcome {
        steering::apply_steering(self, dt, ctx, rng)
    }

    fn eat(&mut self, amount: f64, config: &AppConfig) {
        metabolism::eat(self, amount, config);
    }

    fn can_reach(&self, target: Vec2, bounds: Bounds, config: &AppConfig) -> bool {
        let f = &config.fish;
        let near_bottom = target.y >= bounds.swim_height() - f.bottom_reach_band_px;
        let reach = if near_bottom {
            f.food_reach_radius * f.bottom_reach_multiplier
        } else {
            f.food_reach_radius
        };
        let d = self
            .head_point()
            .distance_to(target)
            .min(self.position.distance_to(target));
        d <= reach
    }

    fn start_mating_anim(&mut self, partner_id: u64, now_sec: f64, config: &AppConfig) {
        self.mating_anim = Some(MatingAnim {
            start_sec: now_sec,
            duration_sec: config.fish.mating_anim_duration,
            partner_id,
            bubble_burst_done: false,
        });
    }

    fn base_speed(&self, config: &AppConfig) -> f64 {
        lifecycle::base_speed(self, config)
    }

    fn snapshot(&self) -> FishSnapshot {
        FishSnapshot {
            id: self.id,
            species_id: self.species_id,
            sex: self.sex,
            position: self.position,
            heading_angle: self.heading_angle,
            current_speed: self.current_speed,
            alive: self.is_alive(),
        }
    }

    fn head_point(&self) -> Vec2 {
        render::head_point(self)
    }

    fn heading(&self, config: &AppConfig) -> HeadingPose {
        render::heading(self, config)
    }

    fn render_params(&self, config: &AppConfig) -> RenderParams {
        render::render_params(self, config)
    }

    fn mouth_open01(&self) -> f64 {
        render::mouth_open01(self)
    }

    fn is_hovering(&self, now_sec: f64) -> bool {
        hover::is_hovering(self, now_sec)
    }

    fn pregnancy_swell01(&self, now_sec: f64) -> f64 {
        render::pregnancy_swell01(self, now_sec)
    }

    fn life_stage_label(&self) -> &'static str {
        self.life_stage.label()
    }
}

#[cfg(test)]
pub(crate) fn test_fish(id: u64) -> Fish {
    use aquarium_data::{
        Behavior, FishHistory, HoverState, HungerState, LifeStage, LifeState, PlayState,
        ReproState, SchoolingState, Sex, SpeciesId, Traits,
    };
    Fish {
        id,
        name: format!("Fish {id}"),
        species_id: SpeciesId::LabMinnow,
        sex: Sex::Female,
        spawn_time_sec: 0.0,
        stage_shift_baby_sec: 0.0,
        stage_shift_juvenile_sec: 0.0,
        traits: Traits::default(),
        adult_radius: 22.0,
        size: 22.0,
        life_stage: LifeStage::Adult,
        growth01: 1.0,
        age_sec_cached: 0.0,
        position: Vec2::new(400.0, 300.0),
        facing: 1,
        heading_angle: 0.0,
        desired_angle: 0.0,
        current_speed: 0.0,
        cruise_phase: 0.0,
        cruise_rate: 0.5,
        target: Vec2::new(600.0, 300.0),
        last_distance_moved: 0.0,
        energy01: 0.5,
        hunger01: 0.5,
        wellbeing01: 0.6,
        water_penalty01: 0.0,
        hunger_state: HungerState::Hungry,
        life_state: LifeState::Alive,
        death_reason: None,
        dead_at_sec: None,
        corpse_removed: false,
        corpse_dirt_applied01: 0.0,
        behavior: Behavior::Wander,
        eat_anim_timer: 0.0,
        eat_anim_duration: 0.22,
        play_state: PlayState::default(),
        repro: ReproState::default(),
        mating_anim: None,
        digest_bites: 0,
        hover: HoverState::default(),
        schooling: SchoolingState::default(),
        last_poop_consumed_at_sec: None,
        last_egg_consumed_at_sec: None,
        egg_snack_cooldown_until_sec: 0.0,
        history: FishHistory::default(),
    }
}
