//! # Aquarium Core
//!
//! The simulation engine for a small freshwater aquarium.
//!
//! This crate contains the deterministic simulation logic:
//! - Fish lifecycle, metabolism, behavior and steering
//! - The [`World`] tick: consumables, play, reproduction, eggs and fixtures
//! - The water hygiene model and the timed filter operations
//! - Feature unlocks, speed gating, save/load and the ecosystem report
//! - Metrics collection and structured logging
//!
//! ## Example
//!
//! ```
//! use aquarium_core::config::AppConfig;
//! use aquarium_core::World;
//!
//! let mut config = AppConfig::default();
//! config.world.seed = Some(42);
//! let mut world = World::new(config);
//! world.spawn_food(200.0, 20.0, None, None);
//! let events = world.update(0.25);
//! assert!(world.sim_time_sec > 0.0);
//! println!("{} events this tick", events.len());
//! ```

/// Tunable parameters for every subsystem
pub mod config;
/// Per-fish logic: spawn, lifecycle, metabolism, behavior, steering
pub mod fish;
/// Angle and scalar helpers
pub mod geometry;
/// Run metrics and logging setup
pub mod metrics;
/// Random helpers and the fixed-value test generator
pub mod rng;
/// Read-only views shared with fish during a tick
pub mod snapshot;
/// The world orchestrator
pub mod world;

pub use config::AppConfig;
pub use fish::FishLogic;
pub use metrics::{init_logging, Metrics};
pub use rng::FixedRng;
pub use world::World;
