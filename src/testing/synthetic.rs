// Synthetic hum fixtures
//
// Builds PCM with a power-line fundamental, optional harmonics, an optional
// "programme" tone and seeded white noise.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::audio::AudioBuffer;
use crate::error::DspError;

/// Default noise seed, shared so fixtures line up across tests
pub const DEFAULT_SEED: u64 = 0x5A5A_FFF0;

/// Sine of `frequency` Hz and peak `amplitude`, starting at zero phase
pub fn sine(frequency: f64, amplitude: f64, sample_rate: u32, frames: usize) -> Vec<f64> {
    (0..frames)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            amplitude * (2.0 * PI * frequency * t).sin()
        })
        .collect()
}

/// Uniform white noise in `[-amplitude, amplitude)`
pub fn white_noise(amplitude: f64, frames: usize, seed: u64) -> Vec<f64> {
    if amplitude <= 0.0 {
        return vec![0.0; frames];
    }

    let mut rng = StdRng::seed_from_u64(seed);
    (0..frames)
        .map(|_| rng.gen_range(-amplitude..amplitude))
        .collect()
}

/// Declarative description of a hum-contaminated test signal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyntheticHum {
    /// Hum fundamental in Hz
    pub fundamental: f64,
    /// Amplitude of the fundamental and each following harmonic, in order
    pub harmonic_amplitudes: Vec<f64>,
    /// Optional wanted tone `(frequency, amplitude)` mixed under the hum
    pub tone: Option<(f64, f64)>,
    /// Peak amplitude of the white noise bed
    pub noise_amplitude: f64,
    pub seed: u64,
}

impl Default for SyntheticHum {
    fn default() -> Self {
        Self {
            fundamental: 60.0,
            harmonic_amplitudes: vec![0.3, 0.15, 0.075],
            tone: Some((440.0, 0.2)),
            noise_amplitude: 0.01,
            seed: DEFAULT_SEED,
        }
    }
}

impl SyntheticHum {
    /// Render `seconds` of audio, identical on every channel except for noise
    ///
    /// Each channel draws noise from `seed + channel index`.
    pub fn render(
        &self,
        sample_rate: u32,
        seconds: f64,
        channels: usize,
    ) -> Result<AudioBuffer, DspError> {
        let frames = (seconds.max(0.0) * sample_rate as f64).round() as usize;
        let mut base = vec![0.0; frames];

        for (index, &amplitude) in self.harmonic_amplitudes.iter().enumerate() {
            let frequency = self.fundamental * (index + 1) as f64;
            if frequency >= sample_rate as f64 / 2.0 {
                break;
            }
            mix_into(&mut base, &sine(frequency, amplitude, sample_rate, frames));
        }

        if let Some((frequency, amplitude)) = self.tone {
            mix_into(&mut base, &sine(frequency, amplitude, sample_rate, frames));
        }

        let rendered = (0..channels.max(1))
            .map(|channel| {
                let mut samples = base.clone();
                let seed = self.seed.wrapping_add(channel as u64);
                let noise = white_noise(self.noise_amplitude, frames, seed);
                mix_into(&mut samples, &noise);
                samples
            })
            .collect();

        AudioBuffer::new(rendered, sample_rate)
    }
}

fn mix_into(target: &mut [f64], source: &[f64]) {
    for (out, &sample) in target.iter_mut().zip(source) {
        *out += sample;
    }
}
