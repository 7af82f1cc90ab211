use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::constants;
use crate::db::StoreOptions;
use crate::error::ConfigError;

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Milliseconds to wait for another invocation holding the store lock
    pub busy_timeout_ms: Option<u64>,
    /// bm25 weight of the shortcut column (other columns weigh 1.0)
    pub shortcut_weight: Option<f64>,
    /// Maximum number of query results
    pub query_limit: Option<u32>,
    /// Pretty-print JSON output
    pub pretty: Option<bool>,
}

impl Config {
    /// Fields set in `other` win over fields set here
    fn merge(&mut self, other: &Config) {
        if other.busy_timeout_ms.is_some() {
            self.busy_timeout_ms = other.busy_timeout_ms;
        }
        if other.shortcut_weight.is_some() {
            self.shortcut_weight = other.shortcut_weight;
        }
        if other.query_limit.is_some() {
            self.query_limit = other.query_limit;
        }
        if other.pretty.is_some() {
            self.pretty = other.pretty;
        }
    }
}

pub struct ConfigManager {
    merged_config: Config,
    pub global_config_path: Option<PathBuf>,
    pub explicit_config_path: Option<PathBuf>,
}

fn parse(path: &Path, content: &str) -> std::result::Result<Config, ConfigError> {
    let config: Config = toml::from_str(content).map_err(|e| ConfigError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;
    if let Some(weight) = config.shortcut_weight {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(ConfigError {
                path: path.to_path_buf(),
                message: format!("shortcut_weight must be a positive number, got {weight}"),
            });
        }
    }
    Ok(config)
}

impl ConfigManager {
    /// Load the global config (if any) and layer the explicit config file over it.
    /// Nothing is ever written; a missing global file just means defaults.
    pub fn new(explicit_path: Option<&Path>) -> Result<Self> {
        let global_config_path = dirs::config_dir().map(|dir| {
            dir.join(constants::GLOBAL_CONFIG_DIR_NAME)
                .join(constants::CONFIG_FILENAME)
        });
        let global_config = match &global_config_path {
            Some(path) => Self::load_global(path),
            None => Config::default(),
        };

        let explicit_config = match explicit_path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| ConfigError {
                    path: path.to_path_buf(),
                    message: format!("failed to read file: {e}"),
                })?;
                Some(parse(path, &content)?)
            }
            None => None,
        };

        Ok(Self::from_parts(
            global_config,
            explicit_config,
            global_config_path,
            explicit_path.map(Path::to_path_buf),
        ))
    }

    fn load_global(path: &Path) -> Config {
        let Ok(content) = fs::read_to_string(path) else {
            return Config::default();
        };
        debug!("Loading config from {}", path.display());
        parse(path, &content).unwrap_or_else(|e| {
            warn!("{}; using defaults", e);
            Config::default()
        })
    }

    fn from_parts(
        global_config: Config,
        explicit_config: Option<Config>,
        global_config_path: Option<PathBuf>,
        explicit_config_path: Option<PathBuf>,
    ) -> Self {
        // Merge configs: explicit file overrides global
        let mut merged_config = global_config;
        if let Some(ref explicit_config) = explicit_config {
            merged_config.merge(explicit_config);
        }

        Self {
            merged_config,
            global_config_path,
            explicit_config_path,
        }
    }

    /// Store settings with defaults filled in
    pub fn store_options(&self) -> StoreOptions {
        let defaults = StoreOptions::default();
        StoreOptions {
            busy_timeout: self
                .merged_config
                .busy_timeout_ms
                .map_or(defaults.busy_timeout, Duration::from_millis),
            shortcut_weight: self
                .merged_config
                .shortcut_weight
                .unwrap_or(defaults.shortcut_weight),
            query_limit: self.merged_config.query_limit.or(defaults.query_limit),
        }
    }

    pub fn pretty(&self) -> bool {
        self.merged_config.pretty.unwrap_or(false)
    }

    /// Get the merged configuration (explicit overrides global)
    pub fn config(&self) -> &Config {
        &self.merged_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_any_file() {
        let manager = ConfigManager::from_parts(Config::default(), None, None, None);
        assert_eq!(manager.store_options(), StoreOptions::default());
        assert!(!manager.pretty());
    }

    #[test]
    fn test_explicit_overrides_global_per_field() {
        let global = Config {
            busy_timeout_ms: Some(100),
            shortcut_weight: Some(3.0),
            query_limit: None,
            pretty: Some(true),
        };
        let explicit = Config {
            shortcut_weight: Some(20.0),
            query_limit: Some(5),
            ..Config::default()
        };
        let manager = ConfigManager::from_parts(global, Some(explicit), None, None);

        let options = manager.store_options();
        assert_eq!(options.busy_timeout, Duration::from_millis(100));
        assert_eq!(options.shortcut_weight, 20.0);
        assert_eq!(options.query_limit, Some(5));
        assert!(manager.pretty());
    }

    #[test]
    fn test_parse_rejects_unknown_keys_and_bad_weight() {
        let path = Path::new("config.toml");
        assert!(parse(path, "query_limit = 3\n").is_ok());
        assert!(parse(path, "model_cache_dir = \"x\"\n").is_err());
        assert!(parse(path, "shortcut_weight = 0.0\n").is_err());
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blitlink.toml");
        fs::write(&path, "pretty = true\nbusy_timeout_ms = 250\n").unwrap();

        let manager = ConfigManager::new(Some(&path)).unwrap();
        assert!(manager.pretty());
        assert_eq!(
            manager.config().busy_timeout_ms,
            Some(250)
        );
        assert_eq!(manager.explicit_config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = ConfigManager::new(Some(&dir.path().join("absent.toml")))
            .err()
            .unwrap();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_malformed_explicit_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "pretty = \"yes please\"\n").unwrap();

        let err = ConfigManager::new(Some(&path)).err().unwrap();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }
}
