//! # Aquarium IO
//!
//! I/O and persistence layer for the aquarium simulation.
//!
//! This crate provides:
//! - Structured error handling with custom error types
//! - Validated JSON helpers with atomic file writes
//! - The versioned save store used for autosave and resume

/// Error types and result aliases for I/O operations
pub mod error;
/// Versioned save file: write, read back, clear
pub mod save;
/// Validated serialization helpers for JSON
pub mod serialization;

pub use error::{IoError, Result};
pub use save::SaveStore;
pub use serialization::{from_json, read_json_file, to_json, to_json_pretty, write_json_file};
