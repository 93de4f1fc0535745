//! Engine configuration.

use std::path::Path;

use crate::{util, Result, DEFAULT_JUMP_BUDGET};

/// Tunable engine parameters.
///
/// Can be read from a `toml` file, or a `yaml` one if the `yaml` feature is
/// enabled. Missing fields fall back to their defaults.
///
/// ```toml
/// jump_budget = 5
/// case_sensitive_keywords = false
/// compress_snapshots = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of chained same-tick jumps allowed after the initial one
    pub jump_budget: usize,
    /// Whether statement keywords have to match case exactly
    pub case_sensitive_keywords: bool,
    /// Whether board snapshots get compressed (requires the `lz4` feature)
    pub compress_snapshots: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            jump_budget: DEFAULT_JUMP_BUDGET,
            case_sensitive_keywords: false,
            compress_snapshots: true,
        }
    }
}

impl EngineConfig {
    /// Reads configuration from file at the given path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let config: EngineConfig = util::deser_struct_from_path(path)?;
        debug!("loaded engine config: {:?}", config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str("jump_budget = 2").unwrap();
        assert_eq!(config.jump_budget, 2);
        assert!(!config.case_sensitive_keywords);
        assert!(config.compress_snapshots);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let path = std::env::temp_dir().join("zzscript_config_test.ini");
        std::fs::write(&path, "jump_budget = 1").unwrap();
        assert!(EngineConfig::from_path(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
