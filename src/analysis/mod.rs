// Analysis module - frequency-domain hum detection
//
// Module organization:
// - spectrum: Hann-windowed FFT magnitude spectrum (SpectralAnalyzer)
// - detector: candidate scoring against the local noise floor (HumDetector)
// - types: detection result structures

pub mod detector;
pub mod spectrum;
pub mod types;

pub use detector::HumDetector;
pub use spectrum::{SpectralAnalyzer, Spectrum};
pub use types::{HumCandidate, HumDetection};
