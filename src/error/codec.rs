// WAV codec error types and constants

use crate::error::ErrorCode;
use log::error;
use thiserror::Error;

/// Codec error code constants
///
/// Error code range: 4001-4004
pub struct CodecErrorCodes {}

impl CodecErrorCodes {
    /// Underlying reader/writer failed
    pub const IO: i32 = 4001;

    /// WAV container could not be parsed or written
    pub const MALFORMED: i32 = 4002;

    /// Sample format the decoder does not handle
    pub const UNSUPPORTED_FORMAT: i32 = 4003;

    /// Decoded samples could not form a valid buffer
    pub const INVALID_LAYOUT: i32 = 4004;
}

/// Log a codec error with structured context
pub fn log_codec_error(err: &CodecError, context: &str) {
    error!(
        "Codec error in {}: code={}, component=WavCodec, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while decoding or encoding WAV data
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed WAV data: {0}")]
    Malformed(#[from] hound::Error),

    #[error("unsupported sample format: {bits} bit {format}")]
    UnsupportedFormat { bits: u16, format: &'static str },

    #[error("invalid channel layout: {reason}")]
    InvalidLayout { reason: String },
}

impl ErrorCode for CodecError {
    fn code(&self) -> i32 {
        match self {
            CodecError::Io(_) => CodecErrorCodes::IO,
            CodecError::Malformed(_) => CodecErrorCodes::MALFORMED,
            CodecError::UnsupportedFormat { .. } => CodecErrorCodes::UNSUPPORTED_FORMAT,
            CodecError::InvalidLayout { .. } => CodecErrorCodes::INVALID_LAYOUT,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
