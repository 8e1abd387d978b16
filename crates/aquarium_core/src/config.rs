//! Configuration for the aquarium simulation.
//!
//! Every tuned constant the simulation reads lives in [`AppConfig`]. The
//! world is built from a config value and never consults globals, so tests
//! can run alternate tunings side by side.
//!
//! ## Example `aquarium.toml`
//!
//! ```toml
//! [world]
//! width = 1200.0
//! height = 700.0
//! initial_fish_count = 4
//! seed = 42
//!
//! [reproduction]
//! base_chance = 0.08
//!
//! [water]
//! reference_fish_count = 20.0
//! ```

use aquarium_data::{SpeciesId, SpeciesProfile};
use serde::{Deserialize, Serialize};

/// Tank geometry, seeding and speed gating.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    pub initial_fish_count: u32,
    pub seed: Option<u64>,
    /// Unlocks every feature and raises the speed cap.
    pub dev_mode: bool,
    pub dev_speed_cap: f64,
    pub min_speed_multiplier: f64,
    /// `(multiplier, sim seconds)` steps, ascending.
    pub speed_unlocks: Vec<(f64, f64)>,
    /// Upper bound for `World::set_fish_count`.
    pub max_fish_count: u32,
    pub algae_spacing_px: f64,
    pub algae_min_count: usize,
    pub algae_radius: [f64; 2],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 700.0,
            initial_fish_count: 4,
            seed: None,
            dev_mode: false,
            dev_speed_cap: 16.0,
            min_speed_multiplier: 0.5,
            speed_unlocks: vec![(2.0, 30.0 * 60.0), (3.0, 120.0 * 60.0)],
            max_fish_count: 50,
            algae_spacing_px: 76.0,
            algae_min_count: 10,
            algae_radius: [28.0, 55.0],
        }
    }
}

/// Kinematics and body geometry shared by every species.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FishConfig {
    pub max_tilt_rad: f64,
    pub target_reached_radius: f64,
    pub retarget_chance: f64,
    pub face_switch_cos: f64,
    pub max_turn_rate: f64,
    pub desired_turn_rate: f64,
    pub speed_multiplier: f64,
    pub base_speed_px: f64,
    pub size_speed_factor: f64,
    pub speed_factor_range: [f64; 2],
    pub hue_range: [f64; 2],
    pub initial_speed_range: [f64; 2],
    pub cruise_rate_range: [f64; 2],
    pub cruise_amplitude: f64,
    pub speed_response: f64,
    pub food_reach_radius: f64,
    pub bottom_reach_multiplier: f64,
    pub bottom_reach_band_px: f64,
    pub dead_sink_speed: f64,
    pub seek_force_multiplier: f64,
    pub wall_influence_ratio: f64,
    pub wall_influence_range: [f64; 2],
    pub wall_strength: f64,
    pub evade_distance: f64,
    pub chase_lookahead_sec: f64,
    pub eat_anim_duration: f64,
    pub mating_anim_duration: f64,
    pub mating_wiggle_px: f64,
    pub mating_bubble_progress: f64,
    pub stage_speed: StageTable,
    pub morph: MorphTable,
}

impl Default for FishConfig {
    fn default() -> Self {
        Self {
            max_tilt_rad: std::f64::consts::FRAC_PI_3,
            target_reached_radius: 18.0,
            retarget_chance: 0.0025,
            face_switch_cos: 0.2,
            max_turn_rate: 1.45,
            desired_turn_rate: 2.1,
            speed_multiplier: 1.5,
            base_speed_px: 20.0,
            size_speed_factor: 0.9,
            speed_factor_range: [0.42, 0.68],
            hue_range: [8.0, 42.0],
            initial_speed_range: [0.9, 1.06],
            cruise_rate_range: [0.35, 0.7],
            cruise_amplitude: 0.18,
            speed_response: 0.8,
            food_reach_radius: 14.0,
            bottom_reach_multiplier: 1.7,
            bottom_reach_band_px: 8.0,
            dead_sink_speed: 30.0,
            seek_force_multiplier: 2.4,
            wall_influence_ratio: 0.22,
            wall_influence_range: [45.0, 110.0],
            wall_strength: 2.2,
            evade_distance: 82.0,
            chase_lookahead_sec: 0.35,
            eat_anim_duration: 0.22,
            mating_anim_duration: 1.1,
            mating_wiggle_px: 5.0,
            mating_bubble_progress: 0.35,
            stage_speed: StageTable {
                baby: 0.82,
                juvenile: 1.04,
                adult: 1.0,
                old: 0.88,
            },
            morph: MorphTable::default(),
        }
    }
}

/// One value per life stage.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct StageTable {
    pub baby: f64,
    pub juvenile: f64,
    pub adult: f64,
    pub old: f64,
}

/// Proportion multipliers a renderer applies per stage.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Morph {
    pub body_length: f64,
    pub body_height: f64,
    pub tail_length: f64,
    pub eye: f64,
    pub saturation: f64,
    pub lightness: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MorphTable {
    pub baby: Morph,
    pub juvenile: Morph,
    pub adult: Morph,
    pub old: Morph,
}

impl Default for MorphTable {
    fn default() -> Self {
        let morph = |body_length, body_height, tail_length, eye, saturation, lightness| Morph {
            body_length,
            body_height,
            tail_length,
            eye,
            saturation,
            lightness,
        };
        Self {
            baby: morph(0.85, 1.12, 0.72, 1.18, 0.85, 1.03),
            juvenile: morph(0.95, 1.03, 0.88, 1.06, 0.93, 1.01),
            adult: morph(1.0, 1.0, 1.0, 1.0, 1.0, 1.0),
            old: morph(1.03, 0.92, 0.95, 0.98, 0.88, 0.96),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HungerConfig {
    pub move_cost_per_px: f64,
    pub food_energy_ratio: f64,
    pub hungry_threshold: f64,
    pub starving_threshold: f64,
    pub vision_hungry: f64,
    pub vision_starving: f64,
    pub boost_hungry: f64,
    pub boost_starving: f64,
    pub wellbeing_hunger_power: f64,
    /// Hunger everyone starts with in a fresh tank.
    pub initial_hunger: f64,
}

impl Default for HungerConfig {
    fn default() -> Self {
        Self {
            move_cost_per_px: 0.00002,
            food_energy_ratio: 0.3,
            hungry_threshold: 0.35,
            starving_threshold: 0.72,
            vision_hungry: 320.0,
            vision_starving: 650.0,
            boost_hungry: 1.3,
            boost_starving: 1.6,
            wellbeing_hunger_power: 1.3,
            initial_hunger: 0.5,
        }
    }
}

/// Idle lingering around an anchor point.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HoverConfig {
    pub duration_sec: [f64; 2],
    pub cooldown_sec: [f64; 2],
    pub retry_sec: [f64; 2],
    pub chance_per_check: f64,
    pub wall_margin_px: f64,
    pub offset_px: [f64; 2],
    pub turn_rate_multiplier: f64,
    pub speed_factor: f64,
    pub speed_response: f64,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            duration_sec: [0.6, 2.0],
            cooldown_sec: [6.0, 14.0],
            retry_sec: [3.0, 8.0],
            chance_per_check: 0.25,
            wall_margin_px: 20.0,
            offset_px: [8.0, 18.0],
            turn_rate_multiplier: 0.2,
            speed_factor: 0.08,
            speed_response: 5.2,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AgeConfig {
    pub lifespan_mean_sec: f64,
    pub lifespan_jitter_sec: f64,
    pub baby_end_sec: f64,
    pub juvenile_end_sec: f64,
    pub stage_jitter_sec: f64,
    pub min_baby_end_sec: f64,
    pub min_juvenile_span_sec: f64,
    /// OLD starts at this fraction of the lifespan, measured in raw age.
    pub old_start_ratio: f64,
    pub initial_max_age_sec: f64,
    pub min_lifespan_sec: f64,
}

impl Default for AgeConfig {
    fn default() -> Self {
        Self {
            lifespan_mean_sec: 180.0 * 60.0,
            lifespan_jitter_sec: 30.0 * 60.0,
            baby_end_sec: 20.0 * 60.0,
            juvenile_end_sec: 50.0 * 60.0,
            stage_jitter_sec: 6.0 * 60.0,
            min_baby_end_sec: 30.0,
            min_juvenile_span_sec: 60.0,
            old_start_ratio: 0.9,
            initial_max_age_sec: 1200.0,
            min_lifespan_sec: 30.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GrowthConfig {
    pub adult_radius: f64,
    pub birth_scale: f64,
    pub size_factor_range: [f64; 2],
    pub growth_rate_range: [f64; 2],
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            adult_radius: 22.0,
            birth_scale: 0.28,
            size_factor_range: [0.9, 1.1],
            growth_rate_range: [0.9, 1.1],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WaterWellbeingConfig {
    pub stress_start_hygiene01: f64,
    pub stress_curve_power: f64,
    pub stress_per_sec: f64,
    pub age_sensitivity_min: f64,
    pub age_sensitivity_edge_boost: f64,
}

impl Default for WaterWellbeingConfig {
    fn default() -> Self {
        Self {
            stress_start_hygiene01: 0.7,
            stress_curve_power: 1.35,
            stress_per_sec: 0.0012,
            age_sensitivity_min: 1.0,
            age_sensitivity_edge_boost: 0.6,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReproductionConfig {
    pub enabled: bool,
    pub encounter_radius_px: f64,
    pub pair_retry_sec: f64,
    pub base_chance: f64,
    pub min_wellbeing: f64,
    pub min_hygiene: f64,
    pub gestation_sec: [f64; 2],
    pub father_cooldown_sec: [f64; 2],
    pub mother_cooldown_sec: [f64; 2],
    pub incubation_sec: [f64; 2],
    /// Incubation stretch for eggs laid outside the nestbrush.
    pub unprotected_incubation_multiplier: f64,
    pub trait_mutation_pct: f64,
    pub lay_reach_px: f64,
    pub lay_cancel_px: f64,
    pub lay_bottom_offset_px: f64,
    pub lay_jitter_x_px: f64,
    pub egg_jitter_px: [f64; 2],
    pub reed_jitter_x_px: f64,
    pub egg_nutrition: f64,
    pub clutch_pressure_damping: f64,
    pub mate_pressure_damping: f64,
    pub hatch_pressure_damping: f64,
    pub hatch_base_chance: f64,
    pub hatch_hygiene_gain: f64,
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            encounter_radius_px: 70.0,
            pair_retry_sec: 25.0,
            base_chance: 0.08,
            min_wellbeing: 0.8,
            min_hygiene: 0.6,
            gestation_sec: [450.0, 540.0],
            father_cooldown_sec: [120.0, 240.0],
            mother_cooldown_sec: [600.0, 1080.0],
            incubation_sec: [180.0, 450.0],
            unprotected_incubation_multiplier: 1.18,
            trait_mutation_pct: 0.05,
            lay_reach_px: 10.0,
            lay_cancel_px: 16.0,
            lay_bottom_offset_px: 14.0,
            lay_jitter_x_px: 20.0,
            egg_jitter_px: [6.0, 4.0],
            reed_jitter_x_px: 12.0,
            egg_nutrition: 0.25,
            clutch_pressure_damping: 0.45,
            mate_pressure_damping: 0.75,
            hatch_pressure_damping: 0.5,
            hatch_base_chance: 0.2,
            hatch_hygiene_gain: 0.8,
        }
    }
}

/// Density throttle and the minnow authority-stress curve.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PressureConfig {
    pub start_ratio: f64,
    pub critical_ratio: f64,
    pub min_start_count: f64,
    pub min_span: f64,
    pub authority_start_count: f64,
    pub authority_max_penalty: f64,
    pub authority_curve_power: f64,
    pub authority_half_effect_delta: f64,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            start_ratio: 0.9,
            critical_ratio: 1.7,
            min_start_count: 6.0,
            min_span: 2.0,
            authority_start_count: 6.0,
            authority_max_penalty: 0.6,
            authority_curve_power: 1.6,
            authority_half_effect_delta: 6.0,
        }
    }
}

/// Hygiene, dirt and the filter rig.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WaterConfig {
    pub reference_fish_count: f64,
    pub baseline_decay_per_sec: f64,
    pub bioload_dirt_per_sec: f64,
    pub dirt_per_expired_food: f64,
    pub hygiene_drop_per_expired_food: f64,
    pub hygiene_drop_per_poop_spawn: f64,
    pub dirt_decay_power: f64,
    pub dirt_decay_strength: f64,
    pub filter_dirt_remove_per_sec: f64,
    pub wear_base_per_sec: f64,
    pub wear_bioload_factor: f64,
    pub wear_dirt_factor: f64,
    pub bioload_mitigation_factor: f64,
    pub tier_dirt_removal_step: f64,
    pub tier_bioload_step: f64,
    pub tier_wear_step: f64,
    pub hygiene_recovery_per_sec: f64,
    pub filter_depleted_threshold01: f64,
    pub install_duration_sec: f64,
    pub maintenance_duration_sec: f64,
    pub maintenance_cooldown_sec: f64,
    pub maintenance_restore_to01: f64,
    pub max_tier: u8,
    /// Feed gates per tier as multiples of the initial fish count.
    pub tier_feed_multipliers: [u64; 3],
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            reference_fish_count: 20.0,
            baseline_decay_per_sec: 0.0002,
            bioload_dirt_per_sec: 0.00028,
            dirt_per_expired_food: 0.010,
            hygiene_drop_per_expired_food: 0.007,
            hygiene_drop_per_poop_spawn: 0.002,
            dirt_decay_power: 1.9,
            dirt_decay_strength: 8.0,
            filter_dirt_remove_per_sec: 0.0006,
            wear_base_per_sec: 0.00005,
            wear_bioload_factor: 1.0,
            wear_dirt_factor: 2.5,
            bioload_mitigation_factor: 0.6,
            tier_dirt_removal_step: 0.25,
            tier_bioload_step: 0.15,
            tier_wear_step: 0.08,
            hygiene_recovery_per_sec: 0.00006,
            filter_depleted_threshold01: 0.1,
            install_duration_sec: 12.0,
            maintenance_duration_sec: 12.0,
            maintenance_cooldown_sec: 25.0,
            maintenance_restore_to01: 1.0,
            max_tier: 3,
            tier_feed_multipliers: [4, 10, 16],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FoodConfig {
    pub default_amount: f64,
    pub min_amount: f64,
    pub default_ttl_sec: f64,
    pub initial_fall_speed: [f64; 2],
    pub fall_accel: f64,
    pub fall_damping: f64,
    pub max_fall_speed: f64,
    /// Smallest bite `consume_food` takes.
    pub min_bite: f64,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            default_amount: 1.0,
            min_amount: 0.1,
            default_ttl_sec: 120.0,
            initial_fall_speed: [8.0, 20.0],
            fall_accel: 8.0,
            fall_damping: 0.15,
            max_fall_speed: 26.0,
            min_bite: 0.05,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PoopConfig {
    pub default_ttl_sec: f64,
    /// Dirt added at once by invisible poop, per unit bioload factor.
    pub invisible_dirt: f64,
    /// Dirt added when a visible poop dissolves, per unit bioload factor.
    pub dissolve_dirt: f64,
    pub drift_speed: f64,
    pub drift_blend_rate: f64,
    pub drift_damping: f64,
    pub bottom_friction: f64,
    pub nutrition: f64,
    pub delay_sec: [f64; 2],
    pub max_delay_sec: f64,
    pub bites_per_poop: u32,
}

impl Default for PoopConfig {
    fn default() -> Self {
        Self {
            default_ttl_sec: 120.0,
            invisible_dirt: 0.00008,
            dissolve_dirt: 0.00008 * 120.0,
            drift_speed: 4.0,
            drift_blend_rate: 1.5,
            drift_damping: 0.99,
            bottom_friction: 0.92,
            nutrition: 0.5,
            delay_sec: [5.0, 10.0],
            max_delay_sec: 30.0,
            bites_per_poop: 2,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CorpseConfig {
    pub grace_sec: f64,
    pub dirt_step_sec: f64,
    pub dirt_initial01: f64,
    pub dirt_step01: f64,
    pub dirt_max01: f64,
}

impl Default for CorpseConfig {
    fn default() -> Self {
        Self {
            grace_sec: 120.0,
            dirt_step_sec: 60.0,
            dirt_initial01: 0.07,
            dirt_step01: 0.01,
            dirt_max01: 0.12,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlayConfig {
    pub min_wellbeing: f64,
    pub encounter_radius: f64,
    pub recruit_radius_scale: f64,
    pub recruit_chance: f64,
    pub max_chasers: usize,
    pub join_radius: f64,
    pub join_chance: f64,
    pub duration_sec: [f64; 2],
    pub failed_roll_delay_sec: f64,
    pub cooldown_sec: [f64; 2],
    pub wellbeing_bonus: f64,
    pub chaser_boost: f64,
    pub runner_boost: f64,
    /// `(near algae, elsewhere)` start probability per stage.
    pub baby_probability: [f64; 2],
    pub juvenile_probability: [f64; 2],
    pub adult_probability: f64,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            min_wellbeing: 0.8,
            encounter_radius: 64.0,
            recruit_radius_scale: 1.25,
            recruit_chance: 0.55,
            max_chasers: 5,
            join_radius: 82.0,
            join_chance: 0.45,
            duration_sec: [4.0, 7.0],
            failed_roll_delay_sec: 10.0,
            cooldown_sec: [5.0, 10.0],
            wellbeing_bonus: 0.03,
            chaser_boost: 1.45,
            runner_boost: 1.18,
            baby_probability: [0.8, 0.5],
            juvenile_probability: [0.5, 0.4],
            adult_probability: 0.2,
        }
    }
}

/// Nestbrush and berry reed tuning.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FixturesConfig {
    pub nestbrush_growth_min_hygiene01: f64,
    pub nestbrush_stage_growth_sec: f64,
    pub nestbrush_max_stage: u8,
    pub nestbrush_capacity_by_stage: [usize; 3],
    pub reed_max_count: usize,
    pub reed_growth_min_hygiene01: f64,
    pub reed_growth_reference_sec: f64,
    pub reed_growth_phases: f64,
    pub reed_capacity: [f64; 3],
    pub reed_fruit_interval_sec: [f64; 2],
    pub reed_fruit_jitter_sec: f64,
    pub reed_min_fruit_interval_sec: f64,
    pub reed_fruit_ttl_sec: f64,
    pub reed_max_fruits: usize,
    pub reed_max_fruits_per_plant: usize,
    pub reed_spawn_height_scale: [f64; 2],
    pub fruit_nutrition: f64,
}

impl Default for FixturesConfig {
    fn default() -> Self {
        Self {
            nestbrush_growth_min_hygiene01: 0.85,
            nestbrush_stage_growth_sec: 720.0,
            nestbrush_max_stage: 3,
            nestbrush_capacity_by_stage: [4, 8, 12],
            reed_max_count: 1,
            reed_growth_min_hygiene01: 0.4,
            reed_growth_reference_sec: 50.0 * 60.0,
            reed_growth_phases: 2.0,
            reed_capacity: [4.0, 6.0, 12.0],
            reed_fruit_interval_sec: [16.0, 48.0],
            reed_fruit_jitter_sec: 4.0,
            reed_min_fruit_interval_sec: 3.0,
            reed_fruit_ttl_sec: 90.0,
            reed_max_fruits: 24,
            reed_max_fruits_per_plant: 20,
            reed_spawn_height_scale: [0.56, 0.66],
            fruit_nutrition: 1.0,
        }
    }
}

impl FixturesConfig {
    #[must_use]
    pub fn reed_max_growth_sec(&self) -> f64 {
        self.reed_growth_reference_sec * self.reed_growth_phases
    }
}

/// Gates for features and add-on species.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UnlockConfig {
    pub nestbrush_births: u64,
    pub berry_reed_births: u64,
    pub berry_reed_hygiene01: f64,
    pub azure_hygiene01: f64,
    pub azure_max_count: usize,
    pub silt_births: u64,
    pub silt_max_count: usize,
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            nestbrush_births: 3,
            berry_reed_births: 4,
            berry_reed_hygiene01: 0.8,
            azure_hygiene01: 0.8,
            azure_max_count: 4,
            silt_births: 10,
            silt_max_count: 4,
        }
    }
}

/// The static species registry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SpeciesConfig {
    pub lab_minnow: SpeciesProfile,
    pub azure_dart: SpeciesProfile,
    pub silt_sifter: SpeciesProfile,
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            lab_minnow: SpeciesProfile::lab_minnow(),
            azure_dart: SpeciesProfile::azure_dart(),
            silt_sifter: SpeciesProfile::silt_sifter(),
        }
    }
}

impl SpeciesConfig {
    #[must_use]
    pub fn get(&self, id: SpeciesId) -> &SpeciesProfile {
        match id {
            SpeciesId::LabMinnow => &self.lab_minnow,
            SpeciesId::AzureDart => &self.azure_dart,
            SpeciesId::SiltSifter => &self.silt_sifter,
        }
    }
}

/// Headless runner cadence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunnerConfig {
    pub max_frame_sec: f64,
    pub hidden_step_sec: f64,
    pub autosave_interval_sec: f64,
    pub metrics_log_interval: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_frame_sec: 0.25,
            hidden_step_sec: 0.25,
            autosave_interval_sec: 10.0,
            metrics_log_interval: 1000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub fish: FishConfig,
    pub hunger: HungerConfig,
    pub hover: HoverConfig,
    pub age: AgeConfig,
    pub growth: GrowthConfig,
    pub water_wellbeing: WaterWellbeingConfig,
    pub reproduction: ReproductionConfig,
    pub pressure: PressureConfig,
    pub water: WaterConfig,
    pub food: FoodConfig,
    pub poop: PoopConfig,
    pub corpse: CorpseConfig,
    pub play: PlayConfig,
    pub fixtures: FixturesConfig,
    pub unlocks: UnlockConfig,
    pub species: SpeciesConfig,
    pub runner: RunnerConfig,
}

fn is_range(range: [f64; 2]) -> bool {
    range[0].is_finite() && range[1].is_finite() && range[0] <= range[1]
}

fn is_unit(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` describing the
    /// first failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // World
        anyhow::ensure!(
            self.world.width > 0.0 && self.world.width.is_finite(),
            "World width must be positive"
        );
        anyhow::ensure!(
            self.world.height > 0.0 && self.world.height.is_finite(),
            "World height must be positive"
        );
        anyhow::ensure!(
            (1..=6).contains(&self.world.initial_fish_count),
            "Initial fish count must be in 1..=6"
        );
        anyhow::ensure!(
            self.world.min_speed_multiplier > 0.0,
            "Minimum speed multiplier must be positive"
        );
        anyhow::ensure!(
            self.world.dev_speed_cap >= self.world.min_speed_multiplier,
            "Dev speed cap must not be below the minimum speed multiplier"
        );
        anyhow::ensure!(
            self.world
                .speed_unlocks
                .windows(2)
                .all(|pair| pair[0].1 <= pair[1].1 && pair[0].0 <= pair[1].0),
            "Speed unlocks must be ascending"
        );
        anyhow::ensure!(
            self.world.max_fish_count >= 1,
            "Max fish count must be at least 1"
        );
        anyhow::ensure!(
            is_range(self.world.algae_radius),
            "Algae radius range is inverted"
        );

        // Fish
        anyhow::ensure!(
            self.fish.max_turn_rate >= 0.0 && self.fish.desired_turn_rate >= 0.0,
            "Turn rates must be non-negative"
        );
        anyhow::ensure!(
            is_unit(self.fish.retarget_chance),
            "Retarget chance must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            is_range(self.fish.speed_factor_range)
                && is_range(self.fish.hue_range)
                && is_range(self.fish.initial_speed_range)
                && is_range(self.fish.cruise_rate_range)
                && is_range(self.fish.wall_influence_range),
            "Fish ranges must not be inverted"
        );
        anyhow::ensure!(
            self.fish.food_reach_radius >= 0.0,
            "Food reach radius must be non-negative"
        );
        anyhow::ensure!(
            self.fish.eat_anim_duration > 0.0 && self.fish.mating_anim_duration > 0.0,
            "Animation durations must be positive"
        );

        // Hunger
        anyhow::ensure!(
            self.hunger.move_cost_per_px >= 0.0,
            "Move cost must be non-negative"
        );
        anyhow::ensure!(
            is_unit(self.hunger.hungry_threshold)
                && is_unit(self.hunger.starving_threshold)
                && self.hunger.hungry_threshold <= self.hunger.starving_threshold,
            "Hunger thresholds must be ordered within [0.0, 1.0]"
        );
        anyhow::ensure!(
            is_unit(self.hunger.initial_hunger),
            "Initial hunger must be in [0.0, 1.0]"
        );

        // Hover
        anyhow::ensure!(
            is_range(self.hover.duration_sec)
                && is_range(self.hover.cooldown_sec)
                && is_range(self.hover.retry_sec)
                && is_range(self.hover.offset_px),
            "Hover ranges must not be inverted"
        );
        anyhow::ensure!(
            is_unit(self.hover.chance_per_check),
            "Hover chance must be in [0.0, 1.0]"
        );

        // Age and growth
        anyhow::ensure!(
            self.age.lifespan_mean_sec > self.age.lifespan_jitter_sec,
            "Lifespan jitter must be smaller than the mean"
        );
        anyhow::ensure!(
            self.age.baby_end_sec > 0.0 && self.age.juvenile_end_sec > self.age.baby_end_sec,
            "Stage boundaries must be positive and ordered"
        );
        anyhow::ensure!(
            is_unit(self.age.old_start_ratio),
            "Old start ratio must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            self.growth.adult_radius > 0.0 && self.growth.birth_scale > 0.0,
            "Growth radii must be positive"
        );
        anyhow::ensure!(
            is_range(self.growth.size_factor_range) && is_range(self.growth.growth_rate_range),
            "Growth ranges must not be inverted"
        );

        // Reproduction
        let repro = &self.reproduction;
        anyhow::ensure!(
            is_unit(repro.base_chance),
            "Mate base chance must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            is_unit(repro.min_wellbeing) && is_unit(repro.min_hygiene),
            "Mate thresholds must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            is_range(repro.gestation_sec)
                && is_range(repro.father_cooldown_sec)
                && is_range(repro.mother_cooldown_sec)
                && is_range(repro.incubation_sec),
            "Reproduction ranges must not be inverted"
        );
        anyhow::ensure!(
            repro.pair_retry_sec >= 0.0 && repro.encounter_radius_px >= 0.0,
            "Encounter settings must be non-negative"
        );
        anyhow::ensure!(
            is_unit(repro.trait_mutation_pct),
            "Trait mutation must be in [0.0, 1.0]"
        );

        // Water
        let water = &self.water;
        anyhow::ensure!(
            water.reference_fish_count >= 1.0,
            "Reference fish count must be at least 1"
        );
        anyhow::ensure!(
            water.baseline_decay_per_sec >= 0.0
                && water.bioload_dirt_per_sec >= 0.0
                && water.filter_dirt_remove_per_sec >= 0.0
                && water.wear_base_per_sec >= 0.0
                && water.hygiene_recovery_per_sec >= 0.0,
            "Water rates must be non-negative"
        );
        anyhow::ensure!(
            water.install_duration_sec > 0.0 && water.maintenance_duration_sec > 0.0,
            "Filter durations must be positive"
        );
        anyhow::ensure!(
            water.maintenance_cooldown_sec >= 0.0,
            "Maintenance cooldown must be non-negative"
        );
        anyhow::ensure!(
            is_unit(water.filter_depleted_threshold01) && is_unit(water.maintenance_restore_to01),
            "Filter levels must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            (1..=3).contains(&water.max_tier),
            "Max filter tier must be in 1..=3"
        );

        // Consumables
        anyhow::ensure!(
            self.food.default_ttl_sec > 0.0 && self.poop.default_ttl_sec > 0.0,
            "Consumable lifetimes must be positive"
        );
        anyhow::ensure!(
            is_range(self.food.initial_fall_speed) && is_range(self.poop.delay_sec),
            "Consumable ranges must not be inverted"
        );
        anyhow::ensure!(
            self.poop.bites_per_poop >= 1,
            "Bites per poop must be at least 1"
        );
        anyhow::ensure!(
            self.corpse.dirt_step_sec > 0.0 && self.corpse.dirt_max01 <= 1.0,
            "Corpse settings out of range"
        );

        // Play
        anyhow::ensure!(
            is_unit(self.play.recruit_chance) && is_unit(self.play.join_chance),
            "Play chances must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            is_range(self.play.duration_sec) && is_range(self.play.cooldown_sec),
            "Play ranges must not be inverted"
        );

        // Fixtures
        anyhow::ensure!(
            self.fixtures.nestbrush_stage_growth_sec > 0.0,
            "Nestbrush growth period must be positive"
        );
        anyhow::ensure!(
            (1..=3).contains(&self.fixtures.nestbrush_max_stage),
            "Nestbrush max stage must be in 1..=3"
        );
        anyhow::ensure!(
            is_range(self.fixtures.reed_fruit_interval_sec)
                && is_range(self.fixtures.reed_spawn_height_scale),
            "Berry reed ranges must not be inverted"
        );
        anyhow::ensure!(
            self.fixtures.reed_growth_reference_sec > 0.0,
            "Berry reed growth reference must be positive"
        );

        // Runner
        anyhow::ensure!(
            self.runner.hidden_step_sec > 0.0,
            "Hidden step must be positive"
        );
        anyhow::ensure!(
            self.runner.max_frame_sec > 0.0,
            "Max frame step must be positive"
        );

        Ok(())
    }

    /// Parses and validates a TOML document. Missing sections keep their
    /// defaults.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Digest of the simulation-relevant sections.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.fish).as_bytes());
        hasher.update(format!("{:?}", self.hunger).as_bytes());
        hasher.update(format!("{:?}", self.hover).as_bytes());
        hasher.update(format!("{:?}", self.age).as_bytes());
        hasher.update(format!("{:?}", self.growth).as_bytes());
        hasher.update(format!("{:?}", self.water_wellbeing).as_bytes());
        hasher.update(format!("{:?}", self.reproduction).as_bytes());
        hasher.update(format!("{:?}", self.pressure).as_bytes());
        hasher.update(format!("{:?}", self.water).as_bytes());
        hasher.update(format!("{:?}", self.food).as_bytes());
        hasher.update(format!("{:?}", self.poop).as_bytes());
        hasher.update(format!("{:?}", self.corpse).as_bytes());
        hasher.update(format!("{:?}", self.play).as_bytes());
        hasher.update(format!("{:?}", self.fixtures).as_bytes());
        hasher.update(format!("{:?}", self.unlocks).as_bytes());
        hasher.update(format!("{:?}", self.species).as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Population above which reproduction starts to throttle.
    #[must_use]
    pub fn pressure_start_count(&self) -> f64 {
        (self.water.reference_fish_count * self.pressure.start_ratio)
            .round()
            .max(self.pressure.min_start_count)
    }

    /// Population at which reproduction pressure saturates.
    #[must_use]
    pub fn pressure_critical_count(&self) -> f64 {
        (self.water.reference_fish_count * self.pressure.critical_ratio)
            .round()
            .max(self.pressure_start_count() + self.pressure.min_span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_world_width() {
        let config = AppConfig {
            world: WorldConfig {
                width: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_fish_count() {
        let config = AppConfig {
            world: WorldConfig {
                initial_fish_count: 7,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_mate_chance() {
        let config = AppConfig {
            reproduction: ReproductionConfig {
                base_chance: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_gestation_range() {
        let config = AppConfig {
            reproduction: ReproductionConfig {
                gestation_sec: [540.0, 450.0],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_hidden_step() {
        let config = AppConfig {
            runner: RunnerConfig {
                hidden_step_sec: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [world]
            width = 800.0
            seed = 7

            [reproduction]
            base_chance = 0.2
            "#,
        )
        .unwrap();
        assert_eq!(config.world.width, 800.0);
        assert_eq!(config.world.height, 700.0);
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.reproduction.base_chance, 0.2);
        assert_eq!(config.reproduction.pair_retry_sec, 25.0);
    }

    #[test]
    fn test_pressure_counts() {
        let config = AppConfig::default();
        assert_eq!(config.pressure_start_count(), 18.0);
        assert_eq!(config.pressure_critical_count(), 34.0);
    }

    #[test]
    fn test_fingerprint_consistency() {
        let config1 = AppConfig::default();
        let mut config2 = AppConfig::default();
        assert_eq!(config1.fingerprint(), config2.fingerprint());
        config2.water.baseline_decay_per_sec = 0.001;
        assert_ne!(config1.fingerprint(), config2.fingerprint());
    }
}
