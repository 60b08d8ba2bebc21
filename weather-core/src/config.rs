use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::model::Coordinates;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_CITY: &str = "london";
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// How the startup lookup finds the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationMode {
    /// Approximate position from the public IP address.
    #[default]
    Ip,
    /// Never locate; only the configured position (if any) is used.
    Off,
}

/// Configuration stored on disk and handed to the lookup flow.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// geolocation = "ip"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,

    /// Override for the OpenWeather endpoint root, mostly for testing.
    pub base_url: Option<String>,

    #[serde(default)]
    pub geolocation: GeolocationMode,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Config {
    /// API key, or an error telling the user how to set one.
    pub fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `weather configure` or set {API_KEY_ENV}."
            )),
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Fixed position, only when both latitude and longitude are set.
    pub fn fixed_position(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
            _ => None,
        }
    }

    /// Let the environment override values from the file.
    /// `var` is `std::env::var` in practice.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = var(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    /// Load from the platform config file with environment overrides applied.
    pub fn load_with_env() -> Result<Self> {
        let mut cfg = Self::load()?;
        cfg.apply_env(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-lookup", "weather-lookup")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_key(key: &str) -> Config {
        Config {
            api_key: Some(key.into()),
            ..Config::default()
        }
    }

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        assert!(err.to_string().contains("No OpenWeather API key configured"));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        assert!(with_key("  ").api_key().is_err());
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = Config::default();

        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
        assert_eq!(cfg.geolocation, GeolocationMode::Ip);
        assert_eq!(cfg.fixed_position(), None);
    }

    #[test]
    fn fixed_position_needs_both_coordinates() {
        let half = Config {
            latitude: Some(48.85),
            ..Config::default()
        };
        assert_eq!(half.fixed_position(), None);

        let full = Config {
            longitude: Some(2.35),
            ..half
        };
        let expected = Coordinates {
            lat: 48.85,
            lon: 2.35,
        };
        assert_eq!(full.fixed_position(), Some(expected));
    }

    #[test]
    fn env_key_overrides_file_key() {
        let mut cfg = with_key("FILE_KEY");

        cfg.apply_env(|name| match name {
            API_KEY_ENV => Some("ENV_KEY".into()),
            _ => None,
        });

        assert_eq!(cfg.api_key().unwrap(), "ENV_KEY");
    }

    #[test]
    fn empty_env_key_keeps_file_key() {
        let mut cfg = with_key("FILE_KEY");

        cfg.apply_env(|_| Some(String::new()));

        assert_eq!(cfg.api_key().unwrap(), "FILE_KEY");
    }

    #[test]
    fn parses_toml_with_geolocation_off() {
        let cfg: Config = toml::from_str(
            r#"
            api_key = "KEY"
            geolocation = "off"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api_key().unwrap(), "KEY");
        assert_eq!(cfg.geolocation, GeolocationMode::Off);
    }

    #[test]
    fn stale_fallback_city_key_is_ignored() {
        let cfg: Config = toml::from_str(
            r#"
            api_key = "KEY"
            default_city = "paris"
            "#,
        )
        .unwrap();

        assert_eq!(cfg, with_key("KEY"));
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_from_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            latitude: Some(1.5),
            longitude: Some(-2.25),
            ..with_key("KEY")
        };
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }
}
