// Detector module - picks the dominant mains fundamental
//
// Each candidate is scored on its fundamental and first harmonics: the peak
// magnitude near k·f divided by the median magnitude of the surrounding
// band (the local noise floor). Normalizing by the local floor keeps the
// score independent of overall loudness.

use crate::analysis::spectrum::Spectrum;
use crate::analysis::types::{HumCandidate, HumDetection};
use crate::config::DetectionConfig;

/// Mains fundamentals checked when none are configured
pub const DEFAULT_CANDIDATES: [f64; 2] = [50.0, 60.0];

/// Fundamental plus this many minus one harmonics contribute to a score
pub const DEFAULT_SCORED_HARMONICS: u32 = 3;

/// Half-width of the window searched for a hum line (Hz)
pub const DEFAULT_PEAK_TOLERANCE_HZ: f64 = 2.0;

/// Half-width of the band used to estimate the noise floor (Hz)
pub const DEFAULT_NOISE_BAND_HZ: f64 = 20.0;

/// Score at which a candidate counts as a confident detection
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 12.0;

const FLOOR_EPSILON: f64 = 1e-12;

/// Scores hum candidates against a magnitude spectrum
#[derive(Debug, Clone)]
pub struct HumDetector {
    candidates: Vec<f64>,
    scored_harmonics: u32,
    peak_tolerance_hz: f64,
    noise_band_hz: f64,
    confidence_threshold: f64,
}

impl Default for HumDetector {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES.to_vec(),
            scored_harmonics: DEFAULT_SCORED_HARMONICS,
            peak_tolerance_hz: DEFAULT_PEAK_TOLERANCE_HZ,
            noise_band_hz: DEFAULT_NOISE_BAND_HZ,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl HumDetector {
    /// Build a detector from the `detection` config section
    ///
    /// An empty candidate list falls back to 50/60 Hz.
    pub fn from_config(config: &DetectionConfig) -> Self {
        let candidates = if config.candidates.is_empty() {
            DEFAULT_CANDIDATES.to_vec()
        } else {
            config.candidates.clone()
        };

        Self {
            candidates,
            scored_harmonics: config.scored_harmonics.max(1),
            peak_tolerance_hz: config.peak_tolerance_hz,
            noise_band_hz: config.noise_band_hz.max(config.peak_tolerance_hz),
            confidence_threshold: config.confidence_threshold,
        }
    }

    pub fn candidates(&self) -> &[f64] {
        &self.candidates
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// Score every candidate, in configured order
    pub fn score_candidates(&self, spectrum: &Spectrum) -> Vec<HumCandidate> {
        self.candidates
            .iter()
            .map(|&frequency| {
                let score = self.score(spectrum, frequency);
                HumCandidate {
                    frequency,
                    score,
                    confident: score >= self.confidence_threshold,
                }
            })
            .collect()
    }

    /// Pick the highest-scoring candidate
    ///
    /// Always returns a best-effort answer. Ties go to the later candidate,
    /// so with the default list an unmarked recording resolves to 60 Hz.
    pub fn detect(&self, spectrum: &Spectrum) -> HumDetection {
        let candidates = self.score_candidates(spectrum);
        let best = candidates
            .iter()
            .copied()
            .reduce(|best, candidate| {
                if candidate.score >= best.score {
                    candidate
                } else {
                    best
                }
            })
            .unwrap_or(HumCandidate {
                frequency: DEFAULT_CANDIDATES[1],
                score: 0.0,
                confident: false,
            });

        HumDetection { best, candidates }
    }

    fn score(&self, spectrum: &Spectrum, fundamental: f64) -> f64 {
        let nyquist = spectrum.max_frequency();

        (1..=self.scored_harmonics)
            .map(|k| fundamental * k as f64)
            .take_while(|&frequency| frequency > 0.0 && frequency < nyquist)
            .map(|frequency| {
                let peak = spectrum.peak_near(frequency, self.peak_tolerance_hz);
                let floor = self.noise_floor(spectrum, frequency);
                peak / floor
            })
            .sum()
    }

    fn noise_floor(&self, spectrum: &Spectrum, frequency: f64) -> f64 {
        spectrum
            .median_in(
                frequency - self.noise_band_hz,
                frequency + self.noise_band_hz,
                Some((
                    frequency - self.peak_tolerance_hz,
                    frequency + self.peak_tolerance_hz,
                )),
            )
            .unwrap_or_else(|| spectrum.mean_magnitude())
            .max(FLOOR_EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::spectrum::SpectralAnalyzer;
    use crate::testing::{sine, white_noise};

    fn spectrum_of(samples: &[f64], sample_rate: u32) -> Spectrum {
        SpectralAnalyzer::default()
            .analyze(samples, sample_rate)
            .unwrap()
    }

    fn hum_signal(fundamental: f64, sample_rate: u32) -> Vec<f64> {
        let frames = sample_rate as usize * 2;
        let noise = white_noise(0.02, frames, 11);
        sine(fundamental, 0.3, sample_rate, frames)
            .iter()
            .zip(sine(fundamental * 2.0, 0.15, sample_rate, frames))
            .zip(noise)
            .map(|((a, b), n)| a + b + n)
            .collect()
    }

    #[test]
    fn test_detects_50hz_hum() {
        let spectrum = spectrum_of(&hum_signal(50.0, 44_100), 44_100);
        let detection = HumDetector::default().detect(&spectrum);

        assert_eq!(detection.best.frequency, 50.0);
        assert!(detection.best.confident);
        assert!(detection.best.score > detection.score_of(60.0).unwrap());
    }

    #[test]
    fn test_detects_60hz_hum_at_low_sample_rate() {
        let spectrum = spectrum_of(&hum_signal(60.0, 8_000), 8_000);
        let detection = HumDetector::default().detect(&spectrum);

        assert_eq!(detection.best.frequency, 60.0);
        assert!(detection.best.confident);
    }

    #[test]
    fn test_noise_only_is_not_confident() {
        let noise = white_noise(0.2, 88_200, 5);
        let spectrum = spectrum_of(&noise, 44_100);
        let detection = HumDetector::default().detect(&spectrum);

        assert!(!detection.best.confident, "score {}", detection.best.score);
        assert_eq!(detection.candidates.len(), 2);
    }

    #[test]
    fn test_silence_ties_resolve_to_60hz() {
        let spectrum = spectrum_of(&vec![0.0; 4_000], 8_000);
        let detection = HumDetector::default().detect(&spectrum);

        assert_eq!(detection.best.frequency, 60.0);
        assert_eq!(detection.best.score, 0.0);
        assert!(!detection.best.confident);
    }

    #[test]
    fn test_from_config_falls_back_to_default_candidates() {
        let config = DetectionConfig {
            candidates: Vec::new(),
            ..DetectionConfig::default()
        };
        let detector = HumDetector::from_config(&config);
        assert_eq!(detector.candidates(), &DEFAULT_CANDIDATES);
    }

    #[test]
    fn test_candidates_above_nyquist_score_zero() {
        let spectrum = spectrum_of(&sine(40.0, 0.5, 100, 200), 100);
        let detector = HumDetector::from_config(&DetectionConfig {
            candidates: vec![60.0],
            ..DetectionConfig::default()
        });
        let scores = detector.score_candidates(&spectrum);
        assert_eq!(scores[0].score, 0.0);
    }
}
