// Configuration module for civiq
// This module handles loading and parsing configuration from ~/.config/civiq/config.toml

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::dispatch::{DEBOUNCE_DELAY, SEARCH_TIMEOUT};

/// Result of loading configuration
pub struct ConfigResult {
    pub config: Config,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub geocoder: GeocoderConfig,
    pub nearby: NearbyConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet window before a query is dispatched, in milliseconds.
    pub debounce_ms: u64,
    /// Overall bound on one search, in seconds.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NearbyConfig {
    pub endpoint: String,
    /// Search radius around the map position, in meters.
    pub radius_m: u32,
    /// Maximum features returned per fetch.
    pub limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            geocoder: GeocoderConfig::default(),
            nearby: NearbyConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_DELAY.as_millis() as u64,
            timeout_secs: SEARCH_TIMEOUT.as_secs(),
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org/search".to_string(),
        }
    }
}

impl Default for NearbyConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://overpass-api.de/api/interpreter".to_string(),
            radius_m: 500,
            limit: 25,
        }
    }
}

impl Config {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search.timeout_secs)
    }
}

/// Loads configuration from ~/.config/civiq/config.toml
/// Returns default configuration if file doesn't exist or on parse errors
pub fn load_config() -> ConfigResult {
    load_config_from(&get_config_path())
}

fn load_config_from(config_path: &Path) -> ConfigResult {
    // If file doesn't exist, return defaults silently
    if !config_path.exists() {
        return ConfigResult {
            config: Config::default(),
            warning: None,
        };
    }

    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            log::error!("Failed to read config file {config_path:?}: {e}");
            return ConfigResult {
                config: Config::default(),
                warning: Some(format!("Failed to read config: {}", e)),
            };
        }
    };

    match toml::from_str::<Config>(&contents) {
        Ok(config) => ConfigResult {
            config,
            warning: None,
        },
        Err(e) => {
            log::error!("Failed to parse config file {config_path:?}: {e}");
            ConfigResult {
                config: Config::default(),
                warning: Some(format!("Invalid config: {}", e)),
            }
        }
    }
}

/// Returns the path to the configuration file
///
/// Always uses ~/.config/civiq/config.toml on all platforms for consistency.
fn get_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("civiq")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.search.timeout_secs, 5);
        assert_eq!(config.nearby.radius_m, 500);
        assert!(config.geocoder.endpoint.contains("nominatim"));
        assert!(config.nearby.endpoint.contains("overpass"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [search]
            debounce_ms = 150
            "#,
        )
        .unwrap();
        assert_eq!(config.search.debounce_ms, 150);
        assert_eq!(config.search.timeout_secs, 5);
        assert_eq!(config.nearby.limit, 25);
    }

    #[test]
    fn test_missing_file_loads_defaults_silently() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_from(&dir.path().join("config.toml"));
        assert!(result.warning.is_none());
        assert_eq!(result.config.search.debounce_ms, 300);
    }

    #[test]
    fn test_invalid_toml_falls_back_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "not [valid toml {{").unwrap();

        let result = load_config_from(&path);
        assert!(result.warning.is_some());
        assert_eq!(result.config.search.debounce_ms, 300);
    }
}
