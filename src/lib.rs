//! Headless runner for the aquarium simulation.
//!
//! The simulation itself lives in `aquarium_core`; this crate wires it to
//! a config file, a save slot and a step loop.

pub mod runner;
pub mod settings;

pub use runner::{RunSummary, Runner, StepMode};
pub use settings::load_config;
