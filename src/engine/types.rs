// Request and result types for the hum removal orchestrator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::analysis::HumCandidate;
use crate::audio::AudioBuffer;
use crate::filter::DEFAULT_QUALITY_FACTOR;

/// Fundamental plus four harmonics
pub const DEFAULT_HARMONIC_COUNT: u32 = 5;

/// Hard ceiling on notches designed per run; larger requests are clamped
pub const MAX_HARMONIC_COUNT: u32 = 32;

/// Which fundamental to remove
///
/// Serializes as `"auto"` or a bare number of Hz.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawTarget", into = "RawTarget")]
pub enum TargetFrequency {
    /// Let the hum detector choose
    #[default]
    Auto,
    /// Use this fundamental in Hz
    Explicit(f64),
}

impl TargetFrequency {
    pub fn is_auto(&self) -> bool {
        matches!(self, TargetFrequency::Auto)
    }
}

impl fmt::Display for TargetFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetFrequency::Auto => write!(f, "auto"),
            TargetFrequency::Explicit(hz) => write!(f, "{hz}"),
        }
    }
}

impl FromStr for TargetFrequency {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Ok(TargetFrequency::Auto);
        }

        let hz: f64 = trimmed
            .trim_end_matches("Hz")
            .trim_end_matches("hz")
            .trim()
            .parse()
            .map_err(|_| format!("expected \"auto\" or a frequency in Hz, got {value:?}"))?;

        TargetFrequency::try_from(RawTarget::Number(hz))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawTarget {
    Number(f64),
    Text(String),
}

impl TryFrom<RawTarget> for TargetFrequency {
    type Error = String;

    fn try_from(raw: RawTarget) -> Result<Self, Self::Error> {
        match raw {
            RawTarget::Number(hz) if hz.is_finite() && hz > 0.0 => {
                Ok(TargetFrequency::Explicit(hz))
            }
            RawTarget::Number(hz) => Err(format!("frequency must be positive, got {hz}")),
            RawTarget::Text(text) => text.parse(),
        }
    }
}

impl From<TargetFrequency> for RawTarget {
    fn from(target: TargetFrequency) -> Self {
        match target {
            TargetFrequency::Auto => RawTarget::Text("auto".to_string()),
            TargetFrequency::Explicit(hz) => RawTarget::Number(hz),
        }
    }
}

/// Parameters of one removal run; read-only to the core
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingRequest {
    pub target: TargetFrequency,
    /// Number of notches: fundamental first, then 2f, 3f, ...
    pub harmonic_count: u32,
    pub quality_factor: f64,
}

impl Default for ProcessingRequest {
    fn default() -> Self {
        Self {
            target: TargetFrequency::Auto,
            harmonic_count: DEFAULT_HARMONIC_COUNT,
            quality_factor: DEFAULT_QUALITY_FACTOR,
        }
    }
}

impl ProcessingRequest {
    pub fn explicit(fundamental: f64) -> Self {
        Self {
            target: TargetFrequency::Explicit(fundamental),
            ..Self::default()
        }
    }

    pub fn auto() -> Self {
        Self::default()
    }

    pub fn with_harmonics(mut self, harmonic_count: u32) -> Self {
        self.harmonic_count = harmonic_count;
        self
    }

    pub fn with_quality_factor(mut self, quality_factor: f64) -> Self {
        self.quality_factor = quality_factor;
        self
    }
}

/// Output of a removal run
///
/// Non-fatal conditions are reported here rather than as errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingResult {
    pub buffer: AudioBuffer,
    /// Fundamental actually used
    pub resolved_frequency: f64,
    /// Frequencies filtered, ascending
    pub harmonics_applied: Vec<f64>,
    /// Frequencies dropped at design time (at/above Nyquist or undesignable)
    pub harmonics_skipped: Vec<f64>,
    /// Detector output when the target was `Auto`
    pub detection: Option<HumCandidate>,
    /// Samples saturated to ±1.0 after filtering
    pub clipped_samples: usize,
}

impl ProcessingResult {
    /// Metadata without the audio payload
    pub fn summary(&self) -> ProcessingSummary {
        ProcessingSummary {
            resolved_frequency: self.resolved_frequency,
            detected_frequency: self
                .detection
                .filter(|candidate| candidate.confident)
                .map(|candidate| candidate.frequency),
            detection_score: self.detection.map(|candidate| candidate.score),
            detection_confident: self.detection.map(|candidate| candidate.confident),
            auto_detected: self.detection.is_some(),
            harmonics_applied: self.harmonics_applied.clone(),
            harmonics_skipped: self.harmonics_skipped.clone(),
            clipped_samples: self.clipped_samples,
            sample_rate: self.buffer.sample_rate(),
            channels: self.buffer.channel_count(),
            frames: self.buffer.frames(),
            message: self.message(),
        }
    }

    /// Human-readable outcome
    pub fn message(&self) -> String {
        let hz = self.resolved_frequency;
        match self.detection {
            Some(candidate) if candidate.confident => {
                format!("Auto-detected and removed {hz} Hz hum and harmonics")
            }
            Some(_) => format!("No hum detected. Applied {hz} Hz filter as precaution"),
            None => format!("Successfully removed {hz} Hz hum and harmonics"),
        }
    }
}

/// Serializable report of a removal run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingSummary {
    pub resolved_frequency: f64,
    /// Set only for a confident detection
    pub detected_frequency: Option<f64>,
    pub detection_score: Option<f64>,
    pub detection_confident: Option<bool>,
    pub auto_detected: bool,
    pub harmonics_applied: Vec<f64>,
    pub harmonics_skipped: Vec<f64>,
    pub clipped_samples: usize,
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: usize,
    pub message: String,
}
