//! Hum removal orchestrator.
//!
//! A run moves through three blocking stages:
//! - **Resolve**: pick the fundamental, either the caller's explicit value or
//!   the hum detector's best candidate. An empty buffer aborts here.
//! - **Design**: one notch per harmonic `k·f` below Nyquist. Harmonics that
//!   cannot be designed are recorded as skipped, never fatal.
//! - **Apply**: zero-phase cascade over every channel in harmonic order.
//!
//! Runs are pure and synchronous. `HumRemover` holds no mutable state and can
//! be shared across threads.

pub mod remover;
pub mod types;

pub use remover::{design_harmonics, HarmonicPlan, HumRemover};
pub use types::{
    ProcessingRequest, ProcessingResult, ProcessingSummary, TargetFrequency,
    DEFAULT_HARMONIC_COUNT, MAX_HARMONIC_COUNT,
};

use crate::analysis::HumCandidate;
use crate::audio::AudioBuffer;
use crate::error::DspError;

/// Remove hum with the default detector configuration
///
/// # Errors
/// `DspError::EmptyBuffer` if the buffer has zero frames.
pub fn remove_hum(
    buffer: AudioBuffer,
    request: &ProcessingRequest,
) -> Result<ProcessingResult, DspError> {
    HumRemover::default().remove_hum(buffer, request)
}

/// Detect the dominant hum fundamental with the default configuration
///
/// # Errors
/// `DspError::EmptyBuffer` if the buffer has zero frames.
pub fn detect_hum(buffer: &AudioBuffer) -> Result<HumCandidate, DspError> {
    HumRemover::default().detect_hum(buffer)
}
