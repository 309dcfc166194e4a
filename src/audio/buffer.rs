// AudioBuffer - owned multi-channel PCM
//
// Samples are stored planar (one Vec per channel) as f64 normalized to
// [-1.0, 1.0]. Every channel has the same length. A buffer with zero frames
// can be built so the processing core can reject it explicitly.

use crate::error::DspError;

/// Planar PCM buffer consumed and produced by the hum removal core
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f64>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from per-channel sample vectors
    ///
    /// # Errors
    /// `DspError::InvalidBuffer` when there are no channels, the sample rate
    /// is zero, or the channels differ in length.
    pub fn new(channels: Vec<Vec<f64>>, sample_rate: u32) -> Result<Self, DspError> {
        if channels.is_empty() {
            return Err(DspError::InvalidBuffer {
                reason: "at least one channel is required".to_string(),
            });
        }

        if sample_rate == 0 {
            return Err(DspError::InvalidBuffer {
                reason: "sample rate must be > 0".to_string(),
            });
        }

        let frames = channels[0].len();
        if let Some((index, channel)) = channels
            .iter()
            .enumerate()
            .find(|(_, channel)| channel.len() != frames)
        {
            return Err(DspError::InvalidBuffer {
                reason: format!(
                    "channel {} has {} samples, expected {}",
                    index,
                    channel.len(),
                    frames
                ),
            });
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Single-channel convenience constructor
    pub fn mono(samples: Vec<f64>, sample_rate: u32) -> Result<Self, DspError> {
        Self::new(vec![samples], sample_rate)
    }

    /// Split interleaved frames (`L R L R ...`) into channels
    ///
    /// A trailing partial frame is rejected rather than silently dropped.
    pub fn from_interleaved(
        samples: &[f64],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self, DspError> {
        if channel_count == 0 {
            return Err(DspError::InvalidBuffer {
                reason: "at least one channel is required".to_string(),
            });
        }

        if samples.len() % channel_count != 0 {
            return Err(DspError::InvalidBuffer {
                reason: format!(
                    "{} interleaved samples do not divide into {} channels",
                    samples.len(),
                    channel_count
                ),
            });
        }

        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Self::new(channels, sample_rate)
    }

    /// Interleave channels back into a single frame-ordered vector
    pub fn to_interleaved(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.frames() * self.channel_count());
        for frame in 0..self.frames() {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel
    pub fn frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Nyquist frequency in Hz
    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> Option<&[f64]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [f64]> {
        self.channels.get_mut(index).map(Vec::as_mut_slice)
    }

    pub fn channels(&self) -> &[Vec<f64>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f64>> {
        self.channels
    }

    /// Average all channels into one mono signal
    pub fn mixdown(&self) -> Vec<f64> {
        if self.channels.len() == 1 {
            return self.channels[0].clone();
        }

        let scale = 1.0 / self.channels.len() as f64;
        (0..self.frames())
            .map(|frame| {
                self.channels
                    .iter()
                    .map(|channel| channel[frame])
                    .sum::<f64>()
                    * scale
            })
            .collect()
    }

    /// Sum of squared samples across all channels
    pub fn energy(&self) -> f64 {
        self.channels
            .iter()
            .flat_map(|channel| channel.iter())
            .map(|&sample| sample * sample)
            .sum()
    }

    /// Largest absolute sample value across all channels
    pub fn peak(&self) -> f64 {
        self.channels
            .iter()
            .flat_map(|channel| channel.iter())
            .fold(0.0f64, |peak, &sample| peak.max(sample.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_mismatched_channels() {
        let result = AudioBuffer::new(vec![vec![0.0; 4], vec![0.0; 3]], 44_100);
        match result {
            Err(DspError::InvalidBuffer { reason }) => {
                assert!(reason.contains("channel 1"), "unexpected reason: {reason}");
            }
            other => panic!("Expected InvalidBuffer, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_zero_sample_rate_and_no_channels() {
        assert!(AudioBuffer::new(vec![vec![0.0; 4]], 0).is_err());
        assert!(AudioBuffer::new(Vec::new(), 44_100).is_err());
    }

    #[test]
    fn test_empty_buffer_is_constructible() {
        let buffer = AudioBuffer::new(vec![Vec::new(), Vec::new()], 48_000).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.channel_count(), 2);
    }

    #[test]
    fn test_interleaved_split_and_join() {
        let interleaved = [0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        let buffer = AudioBuffer::from_interleaved(&interleaved, 2, 8_000).unwrap();

        assert_eq!(buffer.frames(), 3);
        assert_eq!(buffer.channel(0).unwrap(), &[0.1, 0.2, 0.3]);
        assert_eq!(buffer.channel(1).unwrap(), &[-0.1, -0.2, -0.3]);
        assert_eq!(buffer.to_interleaved(), interleaved.to_vec());
    }

    #[test]
    fn test_interleaved_rejects_partial_frame() {
        assert!(AudioBuffer::from_interleaved(&[0.0; 5], 2, 8_000).is_err());
    }

    #[test]
    fn test_mixdown_averages_channels() {
        let buffer = AudioBuffer::new(vec![vec![1.0, 0.5], vec![0.0, -0.5]], 8_000).unwrap();
        assert_eq!(buffer.mixdown(), vec![0.5, 0.0]);
    }

    #[test]
    fn test_energy_and_peak() {
        let buffer = AudioBuffer::new(vec![vec![0.5, -1.0], vec![0.0, 0.25]], 8_000).unwrap();
        assert!((buffer.energy() - 1.3125).abs() < 1e-12);
        assert_eq!(buffer.peak(), 1.0);
        assert_eq!(buffer.nyquist(), 4_000.0);
    }
}
