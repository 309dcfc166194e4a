// HumRemover - Resolve → Design → Apply

use crate::analysis::{HumCandidate, HumDetection, HumDetector, SpectralAnalyzer};
use crate::audio::AudioBuffer;
use crate::config::DetectionConfig;
use crate::engine::types::{
    ProcessingRequest, ProcessingResult, TargetFrequency, MAX_HARMONIC_COUNT,
};
use crate::error::DspError;
use crate::filter::{apply_cascade, design_notch, FilterSpec, MIN_FILTER_LEN};

/// Notches designed for one run plus the harmonics that were dropped
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicPlan {
    /// Ascending by centre frequency, fundamental first
    pub specs: Vec<FilterSpec>,
    pub skipped: Vec<f64>,
}

impl HarmonicPlan {
    pub fn frequencies(&self) -> Vec<f64> {
        self.specs.iter().map(|spec| spec.center_frequency).collect()
    }
}

/// Design one notch per harmonic `1..=harmonic_count` of `fundamental`
///
/// Harmonics at or above Nyquist, and any the designer rejects, go to
/// `skipped` instead of failing the run. `harmonic_count` is clamped to
/// `1..=MAX_HARMONIC_COUNT`.
pub fn design_harmonics(
    fundamental: f64,
    harmonic_count: u32,
    quality_factor: f64,
    sample_rate: u32,
) -> HarmonicPlan {
    let mut plan = HarmonicPlan {
        specs: Vec::new(),
        skipped: Vec::new(),
    };

    for index in 1..=harmonic_count.clamp(1, MAX_HARMONIC_COUNT) {
        let frequency = fundamental * index as f64;
        match design_notch(frequency, quality_factor, sample_rate) {
            Ok(spec) => plan.specs.push(spec),
            Err(_) => plan.skipped.push(frequency),
        }
    }

    plan
}

/// Hum detection and removal with a fixed analyzer/detector configuration
#[derive(Debug, Clone, Default)]
pub struct HumRemover {
    analyzer: SpectralAnalyzer,
    detector: HumDetector,
    low_confidence_fallback: Option<f64>,
}

impl HumRemover {
    pub fn new(analyzer: SpectralAnalyzer, detector: HumDetector) -> Self {
        Self {
            analyzer,
            detector,
            low_confidence_fallback: None,
        }
    }

    /// Build from the `detection` config section
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            analyzer: SpectralAnalyzer::new(config.analysis_seconds),
            detector: HumDetector::from_config(config),
            low_confidence_fallback: config.low_confidence_fallback,
        }
    }

    /// Use `fallback` instead of a detection that is not confident
    pub fn with_low_confidence_fallback(mut self, fallback: Option<f64>) -> Self {
        self.low_confidence_fallback = fallback;
        self
    }

    pub fn detector(&self) -> &HumDetector {
        &self.detector
    }

    /// Score every candidate on the mono mixdown of `buffer`
    ///
    /// # Errors
    /// `DspError::EmptyBuffer` if the buffer has zero frames.
    pub fn detect(&self, buffer: &AudioBuffer) -> Result<HumDetection, DspError> {
        if buffer.is_empty() {
            return Err(DspError::EmptyBuffer);
        }

        let spectrum = self
            .analyzer
            .analyze(&buffer.mixdown(), buffer.sample_rate())?;
        Ok(self.detector.detect(&spectrum))
    }

    /// Best hum candidate for `buffer`
    pub fn detect_hum(&self, buffer: &AudioBuffer) -> Result<HumCandidate, DspError> {
        Ok(self.detect(buffer)?.best)
    }

    /// Remove the fundamental and harmonics described by `request`
    ///
    /// The buffer is consumed and filtered in place; the result carries it
    /// back together with what was actually applied.
    ///
    /// # Errors
    /// `DspError::EmptyBuffer` if the buffer has zero frames. Nothing else
    /// aborts a run.
    pub fn remove_hum(
        &self,
        mut buffer: AudioBuffer,
        request: &ProcessingRequest,
    ) -> Result<ProcessingResult, DspError> {
        let (resolved_frequency, detection) = self.resolve(&buffer, request.target)?;

        let plan = design_harmonics(
            resolved_frequency,
            request.harmonic_count,
            request.quality_factor,
            buffer.sample_rate(),
        );

        if buffer.frames() < MIN_FILTER_LEN {
            return Ok(ProcessingResult {
                buffer,
                resolved_frequency,
                harmonics_applied: Vec::new(),
                harmonics_skipped: plan.skipped,
                detection,
                clipped_samples: 0,
            });
        }

        let mut clipped_samples = 0;
        for channel in 0..buffer.channel_count() {
            clipped_samples += apply_cascade(&mut buffer, channel, &plan.specs)?;
        }

        Ok(ProcessingResult {
            buffer,
            resolved_frequency,
            harmonics_applied: plan.frequencies(),
            harmonics_skipped: plan.skipped,
            detection,
            clipped_samples,
        })
    }

    fn resolve(
        &self,
        buffer: &AudioBuffer,
        target: TargetFrequency,
    ) -> Result<(f64, Option<HumCandidate>), DspError> {
        if buffer.is_empty() {
            return Err(DspError::EmptyBuffer);
        }

        match target {
            TargetFrequency::Explicit(hz) => Ok((hz, None)),
            TargetFrequency::Auto => {
                let best = self.detect_hum(buffer)?;
                let frequency = match self.low_confidence_fallback {
                    Some(fallback) if !best.confident => fallback,
                    _ => best.frequency,
                };
                Ok((frequency, Some(best)))
            }
        }
    }
}
