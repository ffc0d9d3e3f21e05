//! Configuration management for dynamic parameter tuning
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling fast iteration without recompilation. Key parameters for
//! step detection, calorie estimation, and sample delivery can be
//! adjusted via the config file for rapid experimentation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub step_detection: StepDetectionConfig,
    pub energy: EnergyConfig,
    pub sensor: SensorConfig,
}

/// Step detection algorithm parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDetectionConfig {
    /// Y-axis deviation (in g) a sample must exceed to count as a crossing
    pub threshold_g: f64,
    /// Minimum milliseconds since the last accepted step before a new one
    /// may trigger
    pub retrigger_ms: u64,
    /// Milliseconds the detector stays suppressed after an accepted step
    pub cooldown_ms: u64,
}

impl Default for StepDetectionConfig {
    fn default() -> Self {
        Self {
            threshold_g: 1.0,
            // The re-trigger window is shorter than the cooldown, so the
            // cooldown governs observable behavior; both guards are applied.
            retrigger_ms: 800,
            cooldown_ms: 1200,
        }
    }
}

/// Calorie estimation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyConfig {
    /// Calories credited per accepted step
    pub calories_per_step: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            calories_per_step: 0.05,
        }
    }
}

/// Sample delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Nominal accelerometer sampling rate in Hz
    pub sample_rate_hz: u32,
    /// Capacity of the bounded sample channel between backend and worker
    pub channel_capacity: usize,
    /// Log a progress line every N processed samples (0 disables)
    pub log_every_n_samples: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 50,
            channel_capacity: 256,
            log_every_n_samples: 500,
        }
    }
}

impl Default for AppConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            step_detection: StepDetectionConfig::default(),
            energy: EnergyConfig::default(),
            sensor: SensorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or defaults if the file is missing or the
    /// JSON is invalid (both cases are logged, never fatal).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the bundled assets directory
    pub fn load() -> Self {
        Self::load_from_file("assets/tracker_config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.step_detection.threshold_g, 1.0);
        assert_eq!(config.step_detection.retrigger_ms, 800);
        assert_eq!(config.step_detection.cooldown_ms, 1200);
        assert_eq!(config.energy.calories_per_step, 0.05);
        assert_eq!(config.sensor.sample_rate_hz, 50);
    }

    #[test]
    fn test_cooldown_dominates_retrigger_window() {
        let config = StepDetectionConfig::default();
        assert!(config.cooldown_ms > config.retrigger_ms);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(
            parsed.step_detection.threshold_g,
            config.step_detection.threshold_g
        );
        assert_eq!(
            parsed.energy.calories_per_step,
            config.energy.calories_per_step
        );
        assert_eq!(parsed.sensor.channel_capacity, config.sensor.channel_capacity);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("does/not/exist.json");
        assert_eq!(config.step_detection.cooldown_ms, 1200);
    }
}
