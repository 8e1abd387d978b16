use super::environment::Vec2;
use super::species::SpeciesId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Female,
    Male,
}

impl Sex {
    #[must_use]
    pub fn opposite(self) -> Sex {
        match self {
            Sex::Female => Sex::Male,
            Sex::Male => Sex::Female,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HungerState {
    #[default]
    Fed,
    Hungry,
    Starving,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifeState {
    #[default]
    Alive,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifeStage {
    #[default]
    Baby,
    Juvenile,
    Adult,
    Old,
}

impl LifeStage {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            LifeStage::Baby => "Baby",
            LifeStage::Juvenile => "Juvenile",
            LifeStage::Adult => "Adult",
            LifeStage::Old => "Old",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeathReason {
    Starvation,
    OldAge,
}

/// Female reproduction phase. Males stay `Ready` and only use the cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReproPhase {
    #[default]
    Ready,
    Gravid,
    Laying,
    Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayRole {
    #[default]
    None,
    Chaser,
    Runner,
}

/// Kind of thing a fish can bite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdibleKind {
    Pellet,
    Fruit,
    Poop,
    Egg,
}

/// Reference to one edible entity in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdibleRef {
    pub kind: EdibleKind,
    pub id: u64,
}

/// Current movement intent. Each active mode carries its speed multiplier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Behavior {
    #[default]
    Wander,
    #[serde(rename_all = "camelCase")]
    SeekFood { target: EdibleRef, speed_boost: f64 },
    #[serde(rename_all = "camelCase")]
    PlayChase {
        target_fish_id: Option<u64>,
        speed_boost: f64,
    },
    #[serde(rename_all = "camelCase")]
    PlayEvade {
        target_fish_id: Option<u64>,
        speed_boost: f64,
    },
    SeekLayTarget,
    DeadSink,
}

impl Behavior {
    /// Speed multiplier applied on top of the cruise speed.
    #[must_use]
    pub fn speed_boost(&self) -> f64 {
        match self {
            Behavior::SeekFood { speed_boost, .. }
            | Behavior::PlayChase { speed_boost, .. }
            | Behavior::PlayEvade { speed_boost, .. } => *speed_boost,
            Behavior::Wander | Behavior::SeekLayTarget | Behavior::DeadSink => 1.0,
        }
    }

    #[must_use]
    pub fn food_target(&self) -> Option<EdibleRef> {
        match self {
            Behavior::SeekFood { target, .. } => Some(*target),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        matches!(self, Behavior::PlayChase { .. } | Behavior::PlayEvade { .. })
    }
}

/// Heritable numeric traits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct Traits {
    /// Base hue in degrees.
    pub color_hue: f64,
    pub size_factor: f64,
    /// Multiplier on the pace of the life-stage clock.
    pub growth_rate: f64,
    pub lifespan_sec: f64,
    pub speed_factor: f64,
    /// Seed for renderer-side pattern variation.
    pub pattern_seed: f64,
}

impl Default for Traits {
    fn default() -> Self {
        Self {
            color_hue: 25.0,
            size_factor: 1.0,
            growth_rate: 1.0,
            lifespan_sec: 10_800.0,
            speed_factor: 0.55,
            pattern_seed: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct PlayState {
    pub session_id: Option<u64>,
    pub active_until_sec: f64,
    pub target_fish_id: Option<u64>,
    pub role: PlayRole,
    pub started_near_algae: bool,
    pub cooldown_until_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ReproState {
    pub state: ReproPhase,
    pub due_at_sec: Option<f64>,
    pub cooldown_until_sec: f64,
    pub father_id: Option<u64>,
    pub lay_target: Option<Vec2>,
    pub lay_use_nestbrush: bool,
    pub pregnancy_start_sec: Option<f64>,
    pub laying_started_at_sec: Option<f64>,
}

impl ReproState {
    /// Clears everything tied to a pregnancy.
    pub fn clear_pregnancy(&mut self) {
        self.due_at_sec = None;
        self.father_id = None;
        self.lay_target = None;
        self.lay_use_nestbrush = false;
        self.pregnancy_start_sec = None;
        self.laying_started_at_sec = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatingAnim {
    pub start_sec: f64,
    pub duration_sec: f64,
    pub partner_id: u64,
    pub bubble_burst_done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct HoverState {
    pub until_sec: f64,
    pub next_eligible_at_sec: f64,
    pub anchor: Option<Vec2>,
    pub offset: Option<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct SchoolingState {
    /// Per-fish multiplier on the school force.
    pub bias: f64,
    pub solo_until_sec: f64,
    pub next_solo_at_sec: f64,
}

/// Append-only record of a fish's life.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct FishHistory {
    pub mother_id: Option<u64>,
    pub father_id: Option<u64>,
    pub children_ids: Vec<u64>,
    pub born_in_aquarium: bool,
    pub birth_sim_time_sec: f64,
    pub death_sim_time_sec: Option<f64>,
    pub meals_eaten: u64,
    pub mate_count: u64,
}

/// One simulated organism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fish {
    pub id: u64,
    pub name: String,
    pub species_id: SpeciesId,
    pub sex: Sex,
    pub spawn_time_sec: f64,
    pub stage_shift_baby_sec: f64,
    pub stage_shift_juvenile_sec: f64,
    pub traits: Traits,
    /// Radius at full growth; derived from traits and species.
    pub adult_radius: f64,
    /// Current visual radius.
    pub size: f64,
    pub life_stage: LifeStage,
    pub growth01: f64,
    pub age_sec_cached: f64,

    pub position: Vec2,
    /// `1` facing right, `-1` facing left.
    pub facing: i8,
    pub heading_angle: f64,
    pub desired_angle: f64,
    pub current_speed: f64,
    pub cruise_phase: f64,
    pub cruise_rate: f64,
    pub target: Vec2,
    #[serde(skip)]
    pub last_distance_moved: f64,

    pub energy01: f64,
    pub hunger01: f64,
    pub wellbeing01: f64,
    pub water_penalty01: f64,
    pub hunger_state: HungerState,
    pub life_state: LifeState,
    pub death_reason: Option<DeathReason>,
    pub dead_at_sec: Option<f64>,
    pub corpse_removed: bool,
    pub corpse_dirt_applied01: f64,

    pub behavior: Behavior,
    pub eat_anim_timer: f64,
    pub eat_anim_duration: f64,
    pub play_state: PlayState,
    pub repro: ReproState,
    pub mating_anim: Option<MatingAnim>,
    pub digest_bites: u32,
    pub hover: HoverState,
    pub schooling: SchoolingState,
    pub last_poop_consumed_at_sec: Option<f64>,
    pub last_egg_consumed_at_sec: Option<f64>,
    pub egg_snack_cooldown_until_sec: f64,

    pub history: FishHistory,
}

impl Fish {
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.life_state == LifeState::Alive
    }

    #[must_use]
    pub fn is_female(&self) -> bool {
        self.sex == Sex::Female
    }

    #[must_use]
    pub fn age_seconds(&self, now_sec: f64) -> f64 {
        (now_sec - self.spawn_time_sec).max(0.0)
    }

    /// Time between birth and death, or birth and `now_sec` while alive.
    #[must_use]
    pub fn lifetime_sec(&self, now_sec: f64) -> f64 {
        let birth = self.history.birth_sim_time_sec;
        match self.history.death_sim_time_sec {
            Some(death) => (death - birth).max(0.0),
            None => (now_sec - birth).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behavior_serializes_with_mode_tag() {
        let behavior = Behavior::SeekFood {
            target: EdibleRef {
                kind: EdibleKind::Pellet,
                id: 7,
            },
            speed_boost: 1.3,
        };
        let json = serde_json::to_value(&behavior).unwrap();
        assert_eq!(json["mode"], "seekFood");
        assert_eq!(json["speedBoost"], 1.3);
        assert_eq!(json["target"]["kind"], "pellet");

        let back: Behavior = serde_json::from_value(json).unwrap();
        assert_eq!(back, behavior);
        assert_eq!(back.speed_boost(), 1.3);
    }

    #[test]
    fn test_wander_has_unit_boost() {
        assert_eq!(Behavior::Wander.speed_boost(), 1.0);
        assert_eq!(Behavior::DeadSink.speed_boost(), 1.0);
        assert!(Behavior::PlayChase {
            target_fish_id: None,
            speed_boost: 1.45
        }
        .is_playing());
    }

    #[test]
    fn test_clear_pregnancy() {
        let mut repro = ReproState {
            state: ReproPhase::Laying,
            due_at_sec: Some(10.0),
            father_id: Some(3),
            lay_target: Some(Vec2::new(1.0, 2.0)),
            lay_use_nestbrush: true,
            ..Default::default()
        };
        repro.clear_pregnancy();
        assert_eq!(repro.due_at_sec, None);
        assert_eq!(repro.father_id, None);
        assert!(!repro.lay_use_nestbrush);
        assert_eq!(repro.state, ReproPhase::Laying);
    }
}
