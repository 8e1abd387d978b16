use super::environment::{BerryReedPlant, Egg, Food, Fruit, Nestbrush, Poop, WaterState};
use super::fish::Fish;
use serde::{Deserialize, Serialize};

/// Version stamped into every save. Loading any other version is refused.
pub const SAVE_VERSION: u32 = 1;

/// Complete persisted world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    pub save_version: u32,
    pub sim_time_sec: f64,
    pub speed_multiplier: f64,
    pub initial_fish_count: u32,
    pub foods_consumed_count: u64,
    pub food_amount_consumed_total: f64,
    pub births_count: u64,
    pub eggs_laid_count: u64,
    pub deaths_count: u64,
    pub peak_population_count: u64,
    pub grandparent_ids: Vec<u64>,
    pub water: WaterState,
    pub fish: Vec<Fish>,
    pub fish_archive: Vec<Fish>,
    pub eggs: Vec<Egg>,
    pub food: Vec<Food>,
    pub poop: Vec<Poop>,
    pub berry_reed_plants: Vec<BerryReedPlant>,
    pub fruits: Vec<Fruit>,
    pub nestbrush: Option<Nestbrush>,
}

/// Outer wrapper written to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEnvelope<S = WorldState> {
    pub save_version: u32,
    pub saved_at_epoch_ms: i64,
    pub bounds_width: f64,
    pub bounds_height: f64,
    pub world_state: S,
}
