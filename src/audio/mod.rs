// Audio module - PCM buffer type and the WAV codec collaborator

pub mod buffer;
pub mod wav;

// Re-export commonly used types for convenience
pub use buffer::AudioBuffer;
pub use wav::{decode_wav, encode_wav, read_wav, write_wav};
