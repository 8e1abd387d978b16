//! Core data structures for the aquarium simulation.
//!
//! Everything here is plain serializable state. Behaviour lives in
//! `aquarium_core`.

pub mod data;

pub use data::environment::*;
pub use data::fish::*;
pub use data::save::*;
pub use data::species::*;
