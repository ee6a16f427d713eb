//! TOML-based application configuration.
//!
//! Stores user preferences only:
//! - Bell spacing, tone and whether bells are audible
//! - Tick period and threshold edit policy
//! - A default preset query applied at startup
//!
//! Timer state itself is never written to disk. Configuration is stored at
//! `~/.config/belltimer/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audio::{BellTone, BASE_FREQUENCY, BELL_DURATION, HARMONIC_FREQUENCY};
use crate::bells::BELL_INTERVAL;
use crate::clock::TICK_INTERVAL;
use crate::error::ConfigError;
use crate::preset::Preset;
use crate::timer::ThresholdPolicy;

/// Bell-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BellsConfig {
    #[serde(default = "default_bell_interval_ms")]
    pub interval_ms: u64,
    /// Ring the terminal bell; otherwise bells are only logged.
    #[serde(default = "default_true")]
    pub audible: bool,
    #[serde(default = "default_base_frequency")]
    pub base_frequency: f32,
    #[serde(default = "default_harmonic_frequency")]
    pub harmonic_frequency: f32,
    #[serde(default = "default_bell_duration_ms")]
    pub duration_ms: u64,
}

/// Timer-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default)]
    pub threshold_policy: ThresholdPolicy,
}

/// Startup preset configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetConfig {
    /// Query string such as `bell_count=3&w1=300`.
    #[serde(default)]
    pub default_query: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bells: BellsConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub preset: PresetConfig,
}

// Default functions
fn default_bell_interval_ms() -> u64 {
    BELL_INTERVAL.as_millis() as u64
}
fn default_true() -> bool {
    true
}
fn default_base_frequency() -> f32 {
    BASE_FREQUENCY
}
fn default_harmonic_frequency() -> f32 {
    HARMONIC_FREQUENCY
}
fn default_bell_duration_ms() -> u64 {
    BELL_DURATION.as_millis() as u64
}
fn default_tick_ms() -> u64 {
    TICK_INTERVAL.as_millis() as u64
}

impl Default for BellsConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_bell_interval_ms(),
            audible: true,
            base_frequency: BASE_FREQUENCY,
            harmonic_frequency: HARMONIC_FREQUENCY,
            duration_ms: default_bell_duration_ms(),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            threshold_policy: ThresholdPolicy::default(),
        }
    }
}

impl BellsConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn tone(&self) -> BellTone {
        BellTone {
            base_hz: self.base_frequency,
            harmonic_hz: self.harmonic_frequency,
            duration: Duration::from_millis(self.duration_ms),
        }
    }
}

impl TimerConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Returns `~/.config/belltimer[-dev]/` based on BELLTIMER_ENV.
///
/// Set BELLTIMER_ENV=dev to use the development directory.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .ok_or(ConfigError::NoConfigDir)?
        .join(".config");

    let env = std::env::var("BELLTIMER_ENV").unwrap_or_else(|_| "production".to_string());

    Ok(if env == "dev" {
        base_dir.join("belltimer-dev")
    } else {
        base_dir.join("belltimer")
    })
}

impl Config {
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from the default location, or return default if the file does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, or return default if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Persist to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, content).map_err(io_err)
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        if key.is_empty() {
            return None;
        }
        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        match current {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// The configured startup preset, empty if none.
    pub fn default_preset(&self) -> Preset {
        self.preset
            .default_query
            .as_deref()
            .map(Preset::from_query)
            .unwrap_or_default()
    }

    /// Reject values the runner cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer.tick_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.tick_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.bells.duration_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "bells.duration_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.bells.interval_ms, 80);
        assert_eq!(parsed.timer.tick_ms, 1000);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [bells]
            audible = false

            [timer]
            threshold_policy = "reject"
            "#,
        )
        .unwrap();
        assert!(!parsed.bells.audible);
        assert_eq!(parsed.bells.interval(), BELL_INTERVAL);
        assert_eq!(parsed.timer.threshold_policy, ThresholdPolicy::Reject);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("bells.audible").as_deref(), Some("true"));
        assert_eq!(cfg.get("timer.threshold_policy").as_deref(), Some("clamp"));
        assert!(cfg.get("bells.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.preset.default_query = Some("bell_count=2&w1=30&w2=90".into());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.default_preset().warning(2), Some(90));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "bells = 3").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn validate_rejects_zero_tick() {
        let mut cfg = Config::default();
        cfg.timer.tick_ms = 0;
        assert!(cfg.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }
}
