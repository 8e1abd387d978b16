//! Serializable state for fish, consumables, fixtures and saves.

pub mod environment;
pub mod fish;
pub mod save;
pub mod species;
