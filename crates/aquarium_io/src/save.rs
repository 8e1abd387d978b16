//! The single autosave slot.
//!
//! A save is a [`SaveEnvelope`] written as JSON. Reading it back checks the
//! version before anything touches the world; a save from another version
//! reads as "no save".

use crate::error::{IoError, Result};
use crate::serialization::{read_json_file, write_json_file};
use aquarium_core::World;
use aquarium_data::{Bounds, SaveEnvelope, SAVE_VERSION};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// A save read from disk whose version matched.
#[derive(Debug, Clone)]
pub struct LoadedSave {
    /// The raw envelope, handed to [`World::load_from_json`].
    pub envelope: Value,
    pub saved_at_epoch_ms: Option<i64>,
    /// Tank size at save time when both dimensions were usable.
    pub bounds: Option<Bounds>,
}

#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

fn positive_finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Checks the envelope version without decoding the world.
pub fn check_version(envelope: &Value) -> Result<()> {
    let found = envelope.get("saveVersion").and_then(Value::as_u64);
    if found != Some(u64::from(SAVE_VERSION)) {
        return Err(IoError::version_mismatch(SAVE_VERSION, found));
    }
    if !envelope.get("worldState").is_some_and(Value::is_object) {
        return Err(IoError::validation("save has no worldState object"));
    }
    Ok(())
}

impl SaveStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Writes the world, stamped with the current wall-clock time.
    pub fn save(&self, world: &World) -> Result<()> {
        let envelope: SaveEnvelope = world.to_envelope(chrono::Utc::now().timestamp_millis());
        write_json_file(&envelope, &self.path)
            .map_err(|e| e.with_context("writing autosave"))?;
        tracing::debug!(path = ?self.path, sim_time_sec = world.sim_time_sec, "World saved");
        Ok(())
    }

    /// `Ok(None)` when there is no save or it belongs to another version.
    pub fn load(&self) -> Result<Option<LoadedSave>> {
        if !self.exists() {
            return Ok(None);
        }
        let envelope: Value =
            read_json_file(&self.path).map_err(|e| e.with_context("reading autosave"))?;
        match check_version(&envelope) {
            Ok(()) => {}
            Err(IoError::VersionMismatch { found, .. }) => {
                tracing::warn!(?found, expected = SAVE_VERSION, "Ignoring save from another version");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        let width = positive_finite(envelope.get("boundsWidth").and_then(Value::as_f64));
        let height = positive_finite(envelope.get("boundsHeight").and_then(Value::as_f64));
        let saved_at_epoch_ms = envelope.get("savedAtEpochMs").and_then(Value::as_i64);
        Ok(Some(LoadedSave {
            bounds: width.zip(height).map(|(w, h)| Bounds::new(w, h)),
            saved_at_epoch_ms,
            envelope,
        }))
    }

    /// Loads the save into `world`. Returns whether a save was applied.
    pub fn restore_into(&self, world: &mut World) -> Result<bool> {
        let Some(save) = self.load()? else {
            return Ok(false);
        };
        if let Some(bounds) = save.bounds {
            world.resize(bounds.width, bounds.height);
        }
        Ok(world.load_from_json(&save.envelope))
    }

    /// Removes the save. A missing file is not an error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = ?self.path, "Save cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(IoError::FileSystem(e).with_context("clearing save")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquarium_core::AppConfig;

    fn world(seed: u64) -> World {
        let mut config = AppConfig::default();
        config.world.seed = Some(seed);
        World::new(config)
    }

    #[test]
    fn test_missing_save_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("save.json"));
        assert!(store.load().unwrap().is_none());
        assert!(store.clear().is_ok());
    }

    #[test]
    fn test_save_then_restore() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("save.json"));
        let mut original = world(3);
        original.update(0.25);
        store.save(&original).unwrap();

        let mut restored = world(99);
        assert!(store.restore_into(&mut restored).unwrap());
        assert_eq!(restored.sim_time_sec, original.sim_time_sec);
        assert_eq!(restored.fish.len(), original.fish.len());
        assert_eq!(restored.bounds, original.bounds);
    }

    #[test]
    fn test_other_version_reads_as_no_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        std::fs::write(&path, r#"{"saveVersion":7,"worldState":{}}"#).unwrap();
        let store = SaveStore::new(&path);
        assert!(store.load().unwrap().is_none());
        let mut w = world(1);
        assert!(!store.restore_into(&mut w).unwrap());
    }

    #[test]
    fn test_garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        std::fs::write(&path, "not json").unwrap();
        let err = SaveStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("reading autosave"));
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("save.json"));
        store.save(&world(1)).unwrap();
        assert!(store.exists());
        store.clear().unwrap();
        assert!(!store.exists());
    }

    #[test]
    fn test_bad_bounds_are_ignored() {
        let value = serde_json::json!({ "saveVersion": 1, "worldState": {}, "boundsWidth": -5.0 });
        assert!(check_version(&value).is_ok());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        std::fs::write(&path, value.to_string()).unwrap();
        let save = SaveStore::new(&path).load().unwrap().unwrap();
        assert!(save.bounds.is_none());
    }
}
