use crate::code::CodePolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Store settings read from config.yaml. Every field is optional.
///
/// ```yaml
/// codes:
///   truncation: fit-suffix        # or legacy
///   fallback_collisions: resolve  # or skip
/// plans:
///   max_insert_attempts: 5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub codes: CodePolicy,
    pub plans: PlanSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanSettings {
    /// How many times plan creation re-reads and retries after a reference clash
    pub max_insert_attempts: u32,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            max_insert_attempts: 3,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{FallbackCollisions, Truncation};

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.codes.truncation, Truncation::Legacy);
        assert_eq!(config.plans.max_insert_attempts, 3);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "codes:\n  fallback_collisions: resolve\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.codes.fallback_collisions, FallbackCollisions::Resolve);
        assert_eq!(config.codes.truncation, Truncation::Legacy);
        assert_eq!(config.plans.max_insert_attempts, 3);
    }

    #[test]
    fn bad_policy_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "codes:\n  truncation: sometimes\n").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
