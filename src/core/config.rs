//! Configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Flip-gesture confirmation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Whether the device supports proximity-gated wake checks at all
    #[serde(default = "default_proximity_check_supported")]
    pub proximity_check_supported: bool,
    /// Default for the user-toggleable proximity-on-wake preference
    #[serde(default = "default_proximity_on_wake")]
    pub proximity_on_wake_default: bool,
    /// Deadline for the proximity reading in milliseconds
    #[serde(default = "default_proximity_timeout")]
    pub proximity_timeout_ms: u64,
    /// Bounded wake-hold duration for a confirmed gesture in milliseconds
    #[serde(default = "default_gesture_wakelock")]
    pub gesture_wakelock_ms: u64,
}

fn default_proximity_check_supported() -> bool {
    true
}
fn default_proximity_on_wake() -> bool {
    false
}
fn default_proximity_timeout() -> u64 {
    250
}
fn default_gesture_wakelock() -> u64 {
    3000
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            proximity_check_supported: default_proximity_check_supported(),
            proximity_on_wake_default: default_proximity_on_wake(),
            proximity_timeout_ms: default_proximity_timeout(),
            gesture_wakelock_ms: default_gesture_wakelock(),
        }
    }
}

/// Simulated-platform configuration used by the daemon harness
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Maximum range reported by the simulated proximity sensor
    #[serde(default = "default_proximity_max_range")]
    pub proximity_max_range: f32,
    /// Whether the simulated device has a proximity sensor
    #[serde(default = "default_sensor_present")]
    pub sensor_present: bool,
    /// Whether the simulated device has a vibrator
    #[serde(default = "default_vibrator_present")]
    pub vibrator_present: bool,
}

fn default_proximity_max_range() -> f32 {
    5.0
}
fn default_sensor_present() -> bool {
    true
}
fn default_vibrator_present() -> bool {
    true
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            proximity_max_range: default_proximity_max_range(),
            sensor_present: default_sensor_present(),
            vibrator_present: default_vibrator_present(),
        }
    }
}

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Gesture confirmation configuration
    #[serde(default)]
    pub gesture: GestureConfig,
    /// Simulated platform configuration
    #[serde(default)]
    pub sim: SimConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
            Ok(config)
        } else {
            // Return default config if file doesn't exist
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Create parent directories if needed
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "trislider", "TriSlider")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.gesture.proximity_check_supported);
        assert!(!config.gesture.proximity_on_wake_default);
        assert_eq!(config.gesture.proximity_timeout_ms, 250);
        assert_eq!(config.gesture.gesture_wakelock_ms, 3000);
        assert_eq!(config.sim.proximity_max_range, 5.0);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            parsed.gesture.proximity_timeout_ms,
            config.gesture.proximity_timeout_ms
        );
        assert_eq!(parsed.sim.sensor_present, config.sim.sensor_present);
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.gesture.proximity_timeout_ms = 123;
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let parsed: Config = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.gesture.proximity_timeout_ms, 123);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: Config = toml::from_str("[gesture]\nproximity_timeout_ms = 100\n").unwrap();
        assert_eq!(parsed.gesture.proximity_timeout_ms, 100);
        assert!(parsed.gesture.proximity_check_supported);
        assert_eq!(parsed.gesture.gesture_wakelock_ms, 3000);
    }
}
