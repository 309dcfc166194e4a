// Hum Remover Core - power-line hum detection and removal
// Spectral detection of 50/60 Hz hum, biquad notch design, zero-phase cascade

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod testing;

#[cfg(feature = "http")]
pub mod http;

// Re-exports for convenience
pub use analysis::{HumCandidate, HumDetection};
pub use audio::AudioBuffer;
pub use config::AppConfig;
pub use engine::{
    detect_hum, remove_hum, HumRemover, ProcessingRequest, ProcessingResult, ProcessingSummary,
    TargetFrequency,
};
pub use error::{CodecError, DspError, ErrorCode};
pub use filter::{design_notch, FilterSpec};
