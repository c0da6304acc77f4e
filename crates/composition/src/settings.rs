//! Runtime switches for the fixer.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Environment variable the binary reads the settings path from.
pub const SETTINGS_ENV_VAR: &str = "ROAD_UPGRADES_SETTINGS";

#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixerSettings {
    /// Master switch. When false the repair pass never runs, whatever the
    /// activation gate says.
    pub enabled: bool,
    /// Log every applied fix at info level instead of debug.
    pub log_fixes: bool,
    /// Attach `OriginalCompositionFlags` to a record the first time the fixer
    /// rewrites it.
    pub record_original_flags: bool,
}

impl Default for FixerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            log_fixes: false,
            record_original_flags: true,
        }
    }
}

impl FixerSettings {
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid fixer settings: {e}"))
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("failed to encode settings: {e}"))
    }

    /// Read settings from `path`, falling back to defaults if the file is
    /// missing or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Could not read {}: {e}, using default settings", path.display());
                return Self::default();
            }
        };
        match Self::from_json(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("{e} in {}, using default settings", path.display());
                Self::default()
            }
        }
    }

    /// Settings from the file named by `ROAD_UPGRADES_SETTINGS`, or defaults
    /// when the variable is unset.
    pub fn from_env() -> Self {
        match std::env::var_os(SETTINGS_ENV_VAR) {
            Some(path) => Self::load_or_default(Path::new(&path)),
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings = FixerSettings::from_json(r#"{ "log_fixes": true }"#).unwrap();
        assert!(settings.enabled);
        assert!(settings.log_fixes);
        assert!(settings.record_original_flags);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = FixerSettings::from_json("{ enabled: nope").unwrap_err();
        assert!(err.starts_with("invalid fixer settings"), "got {err}");
    }

    #[test]
    fn test_round_trip() {
        let settings = FixerSettings {
            enabled: false,
            log_fixes: true,
            record_original_flags: false,
        };
        let json = settings.to_json().unwrap();
        assert_eq!(FixerSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_load_falls_back_on_missing_or_bad_file() {
        let dir = std::env::temp_dir().join(format!("fixer_settings_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        assert_eq!(
            FixerSettings::load_or_default(&dir.join("absent.json")),
            FixerSettings::default()
        );

        let bad = dir.join("bad.json");
        std::fs::write(&bad, "not json").unwrap();
        assert_eq!(FixerSettings::load_or_default(&bad), FixerSettings::default());

        let good = dir.join("good.json");
        std::fs::write(&good, r#"{ "enabled": false }"#).unwrap();
        assert!(!FixerSettings::load_or_default(&good).enabled);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
