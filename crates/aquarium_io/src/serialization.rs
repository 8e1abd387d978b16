//! JSON helpers with validation and atomic file writes.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub fn to_json<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

pub fn to_json_pretty<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Deserializes data from a JSON string. Blank input is a validation error.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON string"));
    }

    serde_json::from_str(json)
        .map_err(|e| IoError::serialization(format!("JSON deserialization failed: {}", e)))
}

/// Writes JSON next to `path` first, then renames it into place, so a
/// crash mid-write never leaves a truncated file behind.
pub fn write_json_file<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let json = to_json(data)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            IoError::FileSystem(e).with_context(format!("creating directory {:?}", parent))
        })?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    std::fs::write(&tmp, json)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("writing JSON to {:?}", tmp)))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("moving JSON into {:?}", path))
    })?;
    Ok(())
}

pub fn read_json_file<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let json = std::fs::read_to_string(&path).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("reading JSON from {:?}", path.as_ref()))
    })?;
    from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_empty_json_fails() {
        let result: Result<TestData> = from_json("  ");
        assert!(matches!(result, Err(IoError::Validation(_))));
    }

    #[test]
    fn test_invalid_json_fails() {
        let result: Result<TestData> = from_json("{ invalid json");
        assert!(matches!(result, Err(IoError::Serialization(_))));
    }

    #[test]
    fn test_missing_field_fails() {
        let result: Result<TestData> = from_json(r#"{"name":"tank"}"#);
        assert!(matches!(result, Err(IoError::Serialization(_))));
    }

    #[test]
    fn test_pretty_output_parses_back() {
        let data = TestData {
            name: "tank".to_string(),
            value: 4,
        };
        let json = to_json_pretty(&data).unwrap();
        assert!(json.contains('\n'));
        assert_eq!(from_json::<TestData>(&json).unwrap(), data);
    }

    #[test]
    fn test_write_creates_parents_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");
        let data = TestData {
            name: "tank".to_string(),
            value: 7,
        };
        write_json_file(&data, &path).unwrap();
        let restored: TestData = read_json_file(&path).unwrap();
        assert_eq!(restored, data);
        assert!(!dir.path().join("nested").join("data.json.tmp").exists());
    }

    #[test]
    fn test_read_missing_file_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json_file::<TestData, _>(dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("reading JSON"));
    }
}
