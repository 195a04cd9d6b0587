//! `deskpilot.toml` loading with environment overrides.
//!
//! Resolution order: built-in defaults, then the config file (`--config`,
//! else `./deskpilot.toml` when present), then `DESKPILOT_*` variables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use deskpilot_driver::DriverConfig;

use crate::helpers::env_non_empty;

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "deskpilot.toml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default tracing filter when `RUST_LOG` is unset.
    ///
    /// Default: **`info`**
    pub log_level: String,
    pub store: StoreConfig,
    pub driver: DriverConfig,
    pub executor: ExecutorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            store: StoreConfig::default(),
            driver: DriverConfig::default(),
            executor: ExecutorConfig::default(),
        }
    }
}

/// `[store]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// User-global layouts file.
    ///
    /// Default: **`$HOME/.deskpilot/workspace-layouts.json`**
    pub user_file: PathBuf,

    /// Local project directory with one `<id>.json` per layout.
    ///
    /// Default: **`./layouts`**
    pub local_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let home = env_non_empty("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
        Self {
            user_file: home.join(".deskpilot").join("workspace-layouts.json"),
            local_dir: PathBuf::from("layouts"),
        }
    }
}

/// `[executor]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Attach per-action outcomes to run results.
    ///
    /// Default: **false**
    pub verbose: bool,

    /// Directory for screenshot commands; `$HOME/Desktop` when unset.
    pub screenshot_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load from `explicit`, else `./deskpilot.toml`, else defaults, then
    /// apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.is_file() {
                    Self::from_file(local)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(env_non_empty);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `DESKPILOT_USER_LAYOUTS`, `DESKPILOT_LAYOUTS_DIR` and
    /// `DESKPILOT_LOG` as returned by `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("DESKPILOT_USER_LAYOUTS") {
            self.store.user_file = PathBuf::from(path);
        }
        if let Some(dir) = lookup("DESKPILOT_LAYOUTS_DIR") {
            self.store.local_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup("DESKPILOT_LOG") {
            self.log_level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.store.local_dir, PathBuf::from("layouts"));
        assert!(config.store.user_file.ends_with(".deskpilot/workspace-layouts.json"));
        assert!(config.driver.native_input);
        assert!(!config.executor.verbose);
    }

    #[test]
    fn sections_override_defaults() {
        let config = AppConfig::from_toml(
            r#"
            log_level = "debug"

            [store]
            local_dir = "/tmp/layouts"

            [driver]
            native_input = false
            script_program = "/usr/bin/osascript"

            [driver.settle]
            between_actions_ms = 50

            [executor]
            verbose = true
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.store.local_dir, PathBuf::from("/tmp/layouts"));
        assert!(!config.driver.native_input);
        assert_eq!(config.driver.script_program, "/usr/bin/osascript");
        assert_eq!(config.driver.settle.between_actions_ms, 50);
        assert_eq!(config.driver.settle.open_url_ms, 2000);
        assert!(config.executor.verbose);
    }

    #[test]
    fn environment_wins_over_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DESKPILOT_USER_LAYOUTS", "/data/user.json"),
            ("DESKPILOT_LOG", "warn"),
        ]);
        let mut config = AppConfig::from_toml("log_level = \"debug\"").unwrap();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.store.user_file, PathBuf::from("/data/user.json"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.store.local_dir, PathBuf::from("layouts"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(AppConfig::from_toml("[executor]\nverbose = \"yes\"").is_err());
    }
}
