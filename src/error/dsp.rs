// DSP core error types and constants

use crate::error::ErrorCode;
use log::error;
use thiserror::Error;

/// DSP error code constants
///
/// Error code range: 3001-3005
pub struct DspErrorCodes {}

impl DspErrorCodes {
    /// Buffer holds zero frames
    pub const EMPTY_BUFFER: i32 = 3001;

    /// Spectral analysis was handed no samples
    pub const INSUFFICIENT_DATA: i32 = 3002;

    /// Notch centre frequency outside (0, Nyquist)
    pub const INVALID_FREQUENCY: i32 = 3003;

    /// Quality factor not a positive finite number
    pub const INVALID_QUALITY_FACTOR: i32 = 3004;

    /// Buffer shape violates the AudioBuffer invariants
    pub const INVALID_BUFFER: i32 = 3005;
}

/// Log a DSP error with structured context
///
/// The core itself never logs; callers use this at the boundary.
pub fn log_dsp_error(err: &DspError, context: &str) {
    error!(
        "DSP error in {}: code={}, component=HumRemover, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised by the hum detection and removal core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DspError {
    /// The buffer has zero samples; nothing can be computed
    #[error("audio buffer is empty")]
    EmptyBuffer,

    /// The spectral analyzer received a zero-length slice
    #[error("spectral analysis needs at least one sample")]
    InsufficientData,

    /// Centre frequency is non-positive or at/above Nyquist
    #[error("notch frequency {frequency} Hz must lie in (0, {nyquist}) Hz")]
    InvalidFrequency { frequency: f64, nyquist: f64 },

    /// Quality factor is zero, negative or not finite
    #[error("quality factor must be positive (got {quality_factor})")]
    InvalidQualityFactor { quality_factor: f64 },

    /// Channel layout or sample rate is malformed
    #[error("invalid audio buffer: {reason}")]
    InvalidBuffer { reason: String },
}

impl ErrorCode for DspError {
    fn code(&self) -> i32 {
        match self {
            DspError::EmptyBuffer => DspErrorCodes::EMPTY_BUFFER,
            DspError::InsufficientData => DspErrorCodes::INSUFFICIENT_DATA,
            DspError::InvalidFrequency { .. } => DspErrorCodes::INVALID_FREQUENCY,
            DspError::InvalidQualityFactor { .. } => DspErrorCodes::INVALID_QUALITY_FACTOR,
            DspError::InvalidBuffer { .. } => DspErrorCodes::INVALID_BUFFER,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dsp_error_codes() {
        assert_eq!(DspError::EmptyBuffer.code(), DspErrorCodes::EMPTY_BUFFER);
        assert_eq!(
            DspError::InsufficientData.code(),
            DspErrorCodes::INSUFFICIENT_DATA
        );
        assert_eq!(
            DspError::InvalidFrequency {
                frequency: 5000.0,
                nyquist: 4000.0
            }
            .code(),
            DspErrorCodes::INVALID_FREQUENCY
        );
        assert_eq!(
            DspError::InvalidQualityFactor {
                quality_factor: 0.0
            }
            .code(),
            DspErrorCodes::INVALID_QUALITY_FACTOR
        );
        assert_eq!(
            DspError::InvalidBuffer {
                reason: "test".to_string()
            }
            .code(),
            DspErrorCodes::INVALID_BUFFER
        );
    }

    #[test]
    fn test_dsp_error_messages() {
        let err = DspError::InvalidFrequency {
            frequency: 180.0,
            nyquist: 150.0,
        };
        assert_eq!(err.message(), "notch frequency 180 Hz must lie in (0, 150) Hz");
        assert_eq!(DspError::EmptyBuffer.to_string(), "audio buffer is empty");
    }
}
