//! Read-only views handed to fish while the world mutates them one by one.

use crate::config::AppConfig;
use aquarium_data::{
    Bounds, EdibleKind, EdibleRef, Egg, EggState, Food, Poop, Sex, SpeciesId, Vec2,
};

/// Public kinematic state of one fish as of the start of a pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FishSnapshot {
    pub id: u64,
    pub species_id: SpeciesId,
    pub sex: Sex,
    pub position: Vec2,
    pub heading_angle: f64,
    pub current_speed: f64,
    pub alive: bool,
}

/// World position of a fruit hanging on a reed branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FruitSpot {
    pub id: u64,
    pub position: Vec2,
}

/// Everything a fish may look at while deciding and steering.
pub struct FishContext<'a> {
    pub config: &'a AppConfig,
    pub bounds: Bounds,
    pub now_sec: f64,
    pub hygiene01: f64,
    pub fish: &'a [FishSnapshot],
    pub food: &'a [Food],
    pub poop: &'a [Poop],
    pub eggs: &'a [Egg],
    pub fruits: &'a [FruitSpot],
}

impl FishContext<'_> {
    #[must_use]
    pub fn fish_by_id(&self, id: u64) -> Option<&FishSnapshot> {
        self.fish.iter().find(|f| f.id == id)
    }

    /// Live position of an edible, or `None` once it is gone.
    #[must_use]
    pub fn edible_position(&self, target: EdibleRef) -> Option<Vec2> {
        match target.kind {
            EdibleKind::Pellet => self
                .food
                .iter()
                .find(|f| f.id == target.id)
                .map(|f| Vec2::new(f.x, f.y)),
            EdibleKind::Poop => self
                .poop
                .iter()
                .find(|p| p.id == target.id)
                .map(|p| Vec2::new(p.x, p.y)),
            EdibleKind::Egg => self
                .eggs
                .iter()
                .find(|e| e.id == target.id)
                .map(|e| Vec2::new(e.x, e.y)),
            EdibleKind::Fruit => self
                .fruits
                .iter()
                .find(|f| f.id == target.id)
                .map(|f| f.position),
        }
    }

    /// Whether an egg may be snacked on by an egg-eating species.
    #[must_use]
    pub fn egg_is_snackable(&self, egg: &Egg) -> bool {
        egg.state == EggState::Incubating
            && egg.can_be_eaten
            && !egg.is_protected_by_nestbrush
            && self.config.species.get(egg.species_id).eggs_edible
    }
}
