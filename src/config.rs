//! Configuration management for hum removal defaults
//!
//! Replaces process-wide constants with an explicit, serializable structure
//! loaded from JSON. Every field has a default so partial files work, and a
//! missing or malformed file falls back to defaults with a warning.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::detector::{
    DEFAULT_CANDIDATES, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_NOISE_BAND_HZ,
    DEFAULT_PEAK_TOLERANCE_HZ, DEFAULT_SCORED_HARMONICS,
};
use crate::analysis::spectrum::DEFAULT_ANALYSIS_SECONDS;
use crate::engine::{TargetFrequency, DEFAULT_HARMONIC_COUNT, MAX_HARMONIC_COUNT};
use crate::filter::DEFAULT_QUALITY_FACTOR;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "HUM_REMOVER_CONFIG";

/// Config file used when neither a path nor the env var is given
pub const DEFAULT_CONFIG_PATH: &str = "hum_config.json";

/// Request ceiling for `harmonic_count`, matching the default count
pub const DEFAULT_MAX_HARMONICS: u32 = 5;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub processing: ProcessingConfig,
    pub detection: DetectionConfig,
    pub server: ServerConfig,
    /// Verbose logging in the CLI and server
    pub debug: bool,
}

/// Defaults for processing requests that do not specify a value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub target: TargetFrequency,
    /// Fundamental plus harmonics to notch
    pub harmonic_count: u32,
    pub quality_factor: f64,
    /// Largest `harmonic_count` a CLI or HTTP request may ask for
    pub max_harmonics: u32,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            target: TargetFrequency::Auto,
            harmonic_count: DEFAULT_HARMONIC_COUNT,
            quality_factor: DEFAULT_QUALITY_FACTOR,
            max_harmonics: DEFAULT_MAX_HARMONICS,
        }
    }
}

impl ProcessingConfig {
    /// Check a requested harmonic count against `1..=max_harmonics`
    pub fn check_harmonics(&self, harmonic_count: u32) -> Result<u32, String> {
        let max = self.max_harmonics.clamp(1, MAX_HARMONIC_COUNT);
        if (1..=max).contains(&harmonic_count) {
            Ok(harmonic_count)
        } else {
            Err(format!(
                "harmonics must be between 1 and {max}, got {harmonic_count}"
            ))
        }
    }
}

/// Hum detector tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Candidate fundamentals in Hz
    pub candidates: Vec<f64>,
    /// Fundamental plus harmonics contributing to each score
    pub scored_harmonics: u32,
    /// Half-width of the peak search window (Hz)
    pub peak_tolerance_hz: f64,
    /// Half-width of the noise floor band (Hz)
    pub noise_band_hz: f64,
    /// Score at or above which a detection is confident
    pub confidence_threshold: f64,
    /// Leading seconds of audio fed to the spectral analyzer
    pub analysis_seconds: f64,
    /// Fundamental used instead of a non-confident detection, if set
    pub low_confidence_fallback: Option<f64>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES.to_vec(),
            scored_harmonics: DEFAULT_SCORED_HARMONICS,
            peak_tolerance_hz: DEFAULT_PEAK_TOLERANCE_HZ,
            noise_band_hz: DEFAULT_NOISE_BAND_HZ,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            analysis_seconds: DEFAULT_ANALYSIS_SECONDS,
            low_confidence_fallback: None,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:5000".to_string(),
            max_upload_bytes: 50 * 1024 * 1024,
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
    /// The parsed configuration, or defaults if the file is missing or invalid
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
                log::debug!(
                    "[Config] No config at {:?} ({}). Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load from an explicit path, else `$HUM_REMOVER_CONFIG`, else
    /// `hum_config.json` in the working directory
    pub fn load(explicit: Option<&Path>) -> Self {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => match std::env::var(CONFIG_ENV_VAR) {
                Ok(path) => Self::load_from_file(path),
                Err(_) => Self::load_from_file(DEFAULT_CONFIG_PATH),
            },
        }
    }
}
