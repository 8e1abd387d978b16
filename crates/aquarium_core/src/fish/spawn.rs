use super::lifecycle::{base_speed, update_life_cycle};
use super::metabolism::hunger_state_for;
use super::steering::pick_target;
use crate::config::AppConfig;
use crate::geometry::{clamp01, clamp_angle_for_facing};
use crate::rng::{chance, range, range_of};
use aquarium_data::{
    Behavior, Bounds, Fish, FishHistory, HoverState, LifeStage, LifeState, PlayState, ReproState,
    SchoolingState, Sex, SpeciesId, Traits, Vec2,
};
use rand::Rng;
use std::f64::consts::{PI, TAU};

/// Everything the world decides before a fish comes into being.
#[derive(Debug, Clone)]
pub struct SpawnParams {
    pub id: u64,
    pub name: String,
    pub species_id: SpeciesId,
    pub sex: Sex,
    pub position: Vec2,
    /// Sim time at which the fish's age clock started.
    pub spawn_time_sec: f64,
    pub now_sec: f64,
    pub traits: Traits,
    pub stage_shift_baby_sec: f64,
    pub stage_shift_juvenile_sec: f64,
    pub hunger01: f64,
    pub mother_id: Option<u64>,
    pub father_id: Option<u64>,
    pub born_in_aquarium: bool,
}

pub fn spawn_fish<R: Rng + ?Sized>(
    params: SpawnParams,
    bounds: Bounds,
    config: &AppConfig,
    rng: &mut R,
) -> Fish {
    let species = config.species.get(params.species_id);
    let f = &config.fish;
    let adult_radius =
        config.growth.adult_radius * params.traits.size_factor * species.adult_size_scale;

    let facing: i8 = if chance(rng, 0.5) { 1 } else { -1 };
    let base_angle = if facing == -1 { PI } else { 0.0 };
    let heading = clamp_angle_for_facing(
        base_angle + range(rng, -f.max_tilt_rad, f.max_tilt_rad),
        facing,
        f.max_tilt_rad,
    );

    let schooling = if species.schooling.enabled {
        SchoolingState {
            bias: range_of(rng, species.schooling.bias_range),
            solo_until_sec: 0.0,
            next_solo_at_sec: params.now_sec + range_of(rng, species.schooling.solo_cooldown_sec),
        }
    } else {
        SchoolingState::default()
    };

    let energy = clamp01(1.0 - params.hunger01);
    let hunger = 1.0 - energy;
    let mut fish = Fish {
        id: params.id,
        name: params.name,
        species_id: params.species_id,
        sex: params.sex,
        spawn_time_sec: params.spawn_time_sec,
        stage_shift_baby_sec: params.stage_shift_baby_sec,
        stage_shift_juvenile_sec: params.stage_shift_juvenile_sec,
        traits: params.traits,
        adult_radius,
        size: adult_radius * config.growth.birth_scale,
        life_stage: LifeStage::Baby,
        growth01: 0.0,
        age_sec_cached: 0.0,
        position: bounds.clamp_point(params.position),
        facing,
        heading_angle: heading,
        desired_angle: heading,
        current_speed: 0.0,
        cruise_phase: range(rng, 0.0, TAU),
        cruise_rate: range_of(rng, f.cruise_rate_range),
        target: params.position,
        last_distance_moved: 0.0,
        energy01: energy,
        hunger01: hunger,
        wellbeing01: clamp01(1.0 - hunger.powf(config.hunger.wellbeing_hunger_power)),
        water_penalty01: 0.0,
        hunger_state: hunger_state_for(hunger, config),
        life_state: LifeState::Alive,
        death_reason: None,
        dead_at_sec: None,
        corpse_removed: false,
        corpse_dirt_applied01: 0.0,
        behavior: Behavior::Wander,
        eat_anim_timer: 0.0,
        eat_anim_duration: f.eat_anim_duration,
        play_state: PlayState::default(),
        repro: ReproState::default(),
        mating_anim: None,
        digest_bites: 0,
        hover: HoverState {
            next_eligible_at_sec: params.now_sec + range_of(rng, config.hover.cooldown_sec),
            ..HoverState::default()
        },
        schooling,
        last_poop_consumed_at_sec: None,
        last_egg_consumed_at_sec: None,
        egg_snack_cooldown_until_sec: 0.0,
        history: FishHistory {
            mother_id: params.mother_id,
            father_id: params.father_id,
            born_in_aquarium: params.born_in_aquarium,
            birth_sim_time_sec: params.now_sec,
            ..FishHistory::default()
        },
    };

    update_life_cycle(&mut fish, params.now_sec, config);
    fish.current_speed = base_speed(&fish, config) * range_of(rng, f.initial_speed_range);
    fish.target = pick_target(&fish, bounds, config, rng);
    fish
}
