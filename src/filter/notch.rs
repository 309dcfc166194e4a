// Notch module - second-order notch coefficient design
//
// Standard digital biquad notch:
//   w0    = 2π·f0 / fs
//   alpha = sin(w0) / (2·Q)
//   b = [1, -2cos(w0), 1]
//   a = [1 + alpha, -2cos(w0), 1 - alpha]
// with every coefficient divided by a0 so that a0 = 1.

use serde::Serialize;
use std::f64::consts::PI;

use crate::error::DspError;

/// Narrow notch that removes hum while leaving programme material intact
pub const DEFAULT_QUALITY_FACTOR: f64 = 30.0;

/// Immutable notch design for one centre frequency
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterSpec {
    pub center_frequency: f64,
    pub quality_factor: f64,
    pub sample_rate: u32,
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
}

/// Design a notch at `center_frequency` Hz
///
/// # Errors
/// * `DspError::InvalidFrequency` if `center_frequency <= 0` or
///   `center_frequency >= sample_rate / 2`
/// * `DspError::InvalidQualityFactor` if `quality_factor` is not a positive
///   finite number
pub fn design_notch(
    center_frequency: f64,
    quality_factor: f64,
    sample_rate: u32,
) -> Result<FilterSpec, DspError> {
    let nyquist = sample_rate as f64 / 2.0;
    if !(center_frequency > 0.0 && center_frequency < nyquist) {
        return Err(DspError::InvalidFrequency {
            frequency: center_frequency,
            nyquist,
        });
    }

    if !(quality_factor.is_finite() && quality_factor > 0.0) {
        return Err(DspError::InvalidQualityFactor { quality_factor });
    }

    let w0 = 2.0 * PI * center_frequency / sample_rate as f64;
    let alpha = w0.sin() / (2.0 * quality_factor);
    let cos_w0 = w0.cos();

    let b0 = 1.0;
    let b1 = -2.0 * cos_w0;
    let b2 = 1.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_w0;
    let a2 = 1.0 - alpha;

    Ok(FilterSpec {
        center_frequency,
        quality_factor,
        sample_rate,
        b0: b0 / a0,
        b1: b1 / a0,
        b2: b2 / a0,
        a0: 1.0,
        a1: a1 / a0,
        a2: a2 / a0,
    })
}

impl FilterSpec {
    /// Coefficients in the form the biquad recurrence consumes
    pub fn coefficients(&self) -> biquad::Coefficients<f64> {
        biquad::Coefficients {
            a1: self.a1,
            a2: self.a2,
            b0: self.b0,
            b1: self.b1,
            b2: self.b2,
        }
    }

    /// Single-pass magnitude response |H(e^jw)| at `frequency` Hz
    ///
    /// Zero-phase application squares this value.
    pub fn magnitude_at(&self, frequency: f64) -> f64 {
        let w = 2.0 * PI * frequency / self.sample_rate as f64;
        let (cos1, sin1) = (w.cos(), w.sin());
        let (cos2, sin2) = ((2.0 * w).cos(), (2.0 * w).sin());

        let num_re = self.b0 + self.b1 * cos1 + self.b2 * cos2;
        let num_im = -(self.b1 * sin1 + self.b2 * sin2);
        let den_re = self.a0 + self.a1 * cos1 + self.a2 * cos2;
        let den_im = -(self.a1 * sin1 + self.a2 * sin2);

        (num_re.hypot(num_im)) / (den_re.hypot(den_im))
    }

    /// -3 dB bandwidth of the notch in Hz (f0 / Q)
    pub fn bandwidth(&self) -> f64 {
        self.center_frequency / self.quality_factor
    }
}
