//! Deterministic signal generators for tests and the `synth` CLI command.
//!
//! Everything here is seeded so repeated runs produce identical PCM, which
//! keeps attenuation and detection assertions stable.

pub mod synthetic;

pub use synthetic::{sine, white_noise, SyntheticHum};
