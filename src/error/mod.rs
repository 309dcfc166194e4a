// Error types for the hum remover
//
// The DSP core reports through `DspError`; the WAV collaborator reports
// through `CodecError`. Both carry stable numeric codes so the CLI and the
// HTTP layer can surface them without matching on variants.

mod codec;
mod dsp;

pub use codec::{log_codec_error, CodecError, CodecErrorCodes};
pub use dsp::{log_dsp_error, DspError, DspErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent reporting across the
/// CLI and HTTP boundaries.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
