use super::fish::{DeathReason, Traits};
use super::species::SpeciesId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D point or vector in world pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance_to(self, other: Vec2) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    #[must_use]
    pub fn midpoint(self, other: Vec2) -> Vec2 {
        Vec2::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// World extents. Fish swim in `[0, width] x [0, swim_height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn swim_height(&self) -> f64 {
        self.height.max(40.0)
    }

    /// Clamps a point into the swimmable rectangle.
    #[must_use]
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(0.0, self.width.max(0.0)),
            point.y.clamp(0.0, self.swim_height()),
        )
    }
}

/// Water quality and the filter rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterState {
    pub hygiene01: f64,
    pub dirt01: f64,
    pub filter_installed: bool,
    /// Filter health.
    pub filter01: f64,
    pub install_progress01: f64,
    pub maintenance_progress01: f64,
    pub maintenance_cooldown_sec: f64,
    pub upgrade_progress01: f64,
    pub upgrade_target_tier: u8,
    pub filter_unlocked: bool,
    pub filter_enabled: bool,
    /// Filter strength actually applied last tick.
    pub effective_filter01: f64,
    pub filter_tier: u8,
}

impl Default for WaterState {
    fn default() -> Self {
        Self {
            hygiene01: 1.0,
            dirt01: 0.0,
            filter_installed: false,
            filter01: 0.0,
            install_progress01: 0.0,
            maintenance_progress01: 0.0,
            maintenance_cooldown_sec: 0.0,
            upgrade_progress01: 0.0,
            upgrade_target_tier: 0,
            filter_unlocked: false,
            filter_enabled: true,
            effective_filter01: 0.0,
            filter_tier: 0,
        }
    }
}

impl WaterState {
    /// Any timed filter operation still running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.install_progress01 > 0.0
            || self.maintenance_progress01 > 0.0
            || self.upgrade_progress01 > 0.0
    }
}

/// A sinking food pellet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub amount: f64,
    pub ttl: f64,
    pub vy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poop {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub ttl_sec: f64,
    pub max_ttl_sec: f64,
    pub vx: f64,
    pub vy: f64,
    pub can_be_eaten: bool,
    pub nutrition: f64,
    pub bioload_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EggState {
    #[default]
    Incubating,
    Hatched,
    Failed,
}

/// Where a protected egg sits on a nestbrush branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestbrushAttachment {
    pub branch_index: usize,
    /// Position along the branch.
    pub u: f64,
    /// Offset along the branch normal.
    pub v: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Egg {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub laid_at_sec: f64,
    pub hatch_at_sec: f64,
    pub mother_id: Option<u64>,
    pub father_id: Option<u64>,
    pub mother_traits: Traits,
    pub father_traits: Traits,
    pub species_id: SpeciesId,
    pub state: EggState,
    pub can_be_eaten: bool,
    pub nutrition: f64,
    pub is_protected_by_nestbrush: bool,
    pub nestbrush_attachment: Option<NestbrushAttachment>,
}

/// Egg-protecting fixture. At most one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nestbrush {
    pub id: u64,
    pub x: f64,
    pub bottom_y: f64,
    pub height: f64,
    pub stage: u8,
    pub growth_progress_sec: f64,
    pub sway_phase: f64,
    pub sway_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BerryBranch {
    /// Attachment height along the stem, as a fraction of plant height.
    pub t: f64,
    /// `-1` left, `1` right.
    pub side: f64,
    pub len: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BerryReedPlant {
    pub id: u64,
    pub x: f64,
    pub bottom_y: f64,
    pub height: f64,
    pub spawn_height: f64,
    pub max_height: f64,
    pub sway_phase: f64,
    pub sway_rate: f64,
    pub branches: Vec<BerryBranch>,
    /// `None` while fruiting is suspended by poor hygiene.
    pub next_fruit_at_sec: Option<f64>,
    pub growth_elapsed_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fruit {
    pub id: u64,
    pub plant_id: u64,
    pub branch_index: usize,
    pub u: f64,
    pub v: f64,
    pub radius: f64,
    pub created_at_sec: f64,
    pub ttl_sec: f64,
}

/// Decorative algae patch; fish play more eagerly near one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundAlgae {
    pub x: f64,
    pub y: f64,
    pub height: f64,
    pub radius: f64,
}

/// Short-lived cosmetic particle such as a mating bubble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FxParticle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    pub ttl_sec: f64,
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorldEventKind {
    #[serde(rename_all = "camelCase")]
    FoodSpawned { food_id: u64, x: f64, y: f64, amount: f64 },
    #[serde(rename_all = "camelCase")]
    FoodConsumed { food_id: u64, consumed: f64 },
    #[serde(rename_all = "camelCase")]
    FoodExpired { food_id: u64 },
    #[serde(rename_all = "camelCase")]
    PoopConsumed { poop_id: u64, fish_id: u64 },
    #[serde(rename_all = "camelCase")]
    EggConsumed { egg_id: u64, fish_id: u64 },
    #[serde(rename_all = "camelCase")]
    FruitConsumed { fruit_id: u64 },
    #[serde(rename_all = "camelCase")]
    Mated { female_id: u64, male_id: u64 },
    #[serde(rename_all = "camelCase")]
    ClutchLaid { mother_id: u64, count: u32, protected: bool },
    #[serde(rename_all = "camelCase")]
    Hatched { egg_id: u64, fish_id: u64 },
    #[serde(rename_all = "camelCase")]
    HatchFailed { egg_id: u64 },
    #[serde(rename_all = "camelCase")]
    Died { fish_id: u64, reason: Option<DeathReason> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    /// Simulation time at which the event was queued.
    pub t: f64,
    #[serde(flatten)]
    pub kind: WorldEventKind,
}

/// End-of-run summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcosystemReport {
    pub sim_duration_sec: f64,
    pub eggs_laid_count: u64,
    pub births_count: u64,
    pub deaths_count: u64,
    pub peak_population_count: u64,
    pub longest_lived_fish_name: String,
    pub grandparent_count: usize,
    pub food_amount_consumed_total: f64,
}

/// Reason a world-editing action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionFailure {
    Locked,
    MaxCount,
    WorldNotReady,
}

impl fmt::Display for ActionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ActionFailure::Locked => "LOCKED",
            ActionFailure::MaxCount => "MAX_COUNT",
            ActionFailure::WorldNotReady => "WORLD_NOT_READY",
        };
        f.write_str(reason)
    }
}

impl std::error::Error for ActionFailure {}

/// Outcome of a user-invoked world-editing action.
pub type ActionResult = Result<(), ActionFailure>;

/// Gated features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    WaterFilter,
    BerryReed,
    Nestbrush,
    AzureDart,
    SiltSifter,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedUnlock {
    pub target_multiplier: f64,
    pub unlock_at_sec: f64,
    pub remaining_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedUnlockState {
    pub speed_cap: f64,
    pub pending_unlocks: Vec<SpeedUnlock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swim_height_floor() {
        assert_eq!(Bounds::new(100.0, 10.0).swim_height(), 40.0);
        assert_eq!(Bounds::new(100.0, 700.0).swim_height(), 700.0);
    }

    #[test]
    fn test_clamp_point() {
        let bounds = Bounds::new(200.0, 100.0);
        let p = bounds.clamp_point(Vec2::new(-5.0, 1e6));
        assert_eq!(p, Vec2::new(0.0, 100.0));
    }

    #[test]
    fn test_event_flattens_kind() {
        let event = WorldEvent {
            t: 1.5,
            kind: WorldEventKind::FoodExpired { food_id: 4 },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "foodExpired");
        assert_eq!(json["foodId"], 4);
        assert_eq!(json["t"], 1.5);
    }

    #[test]
    fn test_action_failure_display() {
        assert_eq!(ActionFailure::MaxCount.to_string(), "MAX_COUNT");
        let result: ActionResult = Err(ActionFailure::Locked);
        assert!(result.is_err());
    }
}
