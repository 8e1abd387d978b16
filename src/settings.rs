use anyhow::{Context, Result};
use aquarium_core::AppConfig;
use std::path::Path;

/// Reads a TOML config. A missing file means defaults; an unreadable or
/// invalid one is an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    if !path.exists() {
        tracing::info!(path = ?path, "Config file not found, using defaults");
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    AppConfig::from_toml(&content).with_context(|| format!("parsing config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(load_config(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aquarium.toml");
        std::fs::write(&path, "[world]\ninitial_fish_count = 2\nseed = 9\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.world.initial_fish_count, 2);
        assert_eq!(config.world.seed, Some(9));
        assert_eq!(config.water, AppConfig::default().water);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aquarium.toml");
        std::fs::write(&path, "[world]\ninitial_fish_count = 40\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
