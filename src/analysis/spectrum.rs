// Spectrum module - magnitude spectrum computation
//
// This module handles FFT computation with Hann windowing to reduce
// spectral leakage. The resulting magnitude spectrum is consumed by the hum
// detector and by attenuation measurements.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::DspError;

/// Smallest transform size; shorter inputs are zero-padded up to it
pub const MIN_FFT_SIZE: usize = 8192;

/// Default length of the analysed segment, taken from the start of the signal
pub const DEFAULT_ANALYSIS_SECONDS: f64 = 2.0;

/// Floor used wherever a magnitude ends up in a denominator
const MAGNITUDE_EPSILON: f64 = 1e-12;

/// Single-sided magnitude spectrum
///
/// Bin `i` sits at `i * sample_rate / fft_size` Hz. Magnitudes are scaled so
/// a sine of amplitude `A` reads approximately `A` at its bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    magnitudes: Vec<f64>,
    sample_rate: u32,
    fft_size: usize,
}

impl Spectrum {
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Frequency spacing between adjacent bins in Hz
    pub fn bin_width(&self) -> f64 {
        self.sample_rate as f64 / self.fft_size as f64
    }

    /// Highest frequency represented (Nyquist)
    pub fn max_frequency(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    pub fn frequency_of(&self, bin: usize) -> f64 {
        bin as f64 * self.bin_width()
    }

    /// Nearest bin to `frequency`, clamped into the spectrum
    pub fn bin_of(&self, frequency: f64) -> usize {
        let bin = (frequency.max(0.0) / self.bin_width()).round() as usize;
        bin.min(self.magnitudes.len() - 1)
    }

    /// Magnitude at the bin nearest to `frequency`
    pub fn magnitude_at(&self, frequency: f64) -> f64 {
        self.magnitudes[self.bin_of(frequency)]
    }

    /// Magnitude at `frequency` in dB (20·log10), floored to avoid -inf
    pub fn magnitude_db_at(&self, frequency: f64) -> f64 {
        20.0 * self.magnitude_at(frequency).max(MAGNITUDE_EPSILON).log10()
    }

    /// Largest magnitude within `frequency ± tolerance`
    ///
    /// When the window is narrower than one bin, the nearest bin is used.
    pub fn peak_near(&self, frequency: f64, tolerance: f64) -> f64 {
        match self.bin_range(frequency - tolerance, frequency + tolerance) {
            Some((lo, hi)) => self.magnitudes[lo..=hi]
                .iter()
                .copied()
                .fold(0.0, f64::max),
            None => self.magnitude_at(frequency),
        }
    }

    /// Median magnitude over `[low, high]` Hz, skipping bins inside `exclude`
    ///
    /// Returns `None` when no bin qualifies.
    pub fn median_in(&self, low: f64, high: f64, exclude: Option<(f64, f64)>) -> Option<f64> {
        let (lo, hi) = self.bin_range(low, high)?;
        let excluded = exclude.and_then(|(start, end)| self.bin_range(start, end));

        let mut values: Vec<f64> = (lo..=hi)
            .filter(|bin| match excluded {
                Some((ex_lo, ex_hi)) => *bin < ex_lo || *bin > ex_hi,
                None => true,
            })
            .map(|bin| self.magnitudes[bin])
            .collect();

        if values.is_empty() {
            return None;
        }

        values.sort_by(|a, b| a.total_cmp(b));
        let mid = values.len() / 2;
        Some(if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        })
    }

    /// Mean magnitude excluding the DC bin
    pub fn mean_magnitude(&self) -> f64 {
        let tail = &self.magnitudes[1.min(self.magnitudes.len())..];
        if tail.is_empty() {
            return 0.0;
        }
        tail.iter().sum::<f64>() / tail.len() as f64
    }

    /// Inclusive bin range covering `[low, high]` Hz, or `None` if empty
    fn bin_range(&self, low: f64, high: f64) -> Option<(usize, usize)> {
        let width = self.bin_width();
        let last = self.magnitudes.len() - 1;
        let lo = (low.max(0.0) / width).ceil() as usize;
        let hi = ((high / width).floor().max(0.0) as usize).min(last);

        if high < 0.0 || lo > hi {
            None
        } else {
            Some((lo, hi))
        }
    }
}

/// Computes windowed magnitude spectra of mono PCM slices
#[derive(Debug, Clone)]
pub struct SpectralAnalyzer {
    analysis_seconds: f64,
    min_fft_size: usize,
}

impl Default for SpectralAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_ANALYSIS_SECONDS)
    }
}

impl SpectralAnalyzer {
    /// Create an analyzer that inspects the first `analysis_seconds` of input
    ///
    /// A non-positive or non-finite duration analyses the whole slice.
    pub fn new(analysis_seconds: f64) -> Self {
        Self {
            analysis_seconds,
            min_fft_size: MIN_FFT_SIZE,
        }
    }

    /// Override the minimum transform size (rounded up to a power of two)
    pub fn with_min_fft_size(mut self, min_fft_size: usize) -> Self {
        self.min_fft_size = min_fft_size.max(2).next_power_of_two();
        self
    }

    /// Number of leading samples analysed for a given input length
    pub fn segment_len(&self, available: usize, sample_rate: u32) -> usize {
        if self.analysis_seconds.is_finite() && self.analysis_seconds > 0.0 {
            let limit = (self.analysis_seconds * sample_rate as f64).ceil() as usize;
            available.min(limit.max(1))
        } else {
            available
        }
    }

    /// Compute the magnitude spectrum of `samples`
    ///
    /// Applies a Hann window over the analysed segment, zero-pads to
    /// `max(min_fft_size, next_power_of_two(len))` and returns the
    /// positive-frequency bins (`fft_size / 2 + 1` values).
    ///
    /// # Errors
    /// `DspError::InsufficientData` when `samples` is empty.
    pub fn analyze(&self, samples: &[f64], sample_rate: u32) -> Result<Spectrum, DspError> {
        if samples.is_empty() {
            return Err(DspError::InsufficientData);
        }

        if sample_rate == 0 {
            return Err(DspError::InvalidBuffer {
                reason: "sample rate must be > 0".to_string(),
            });
        }

        let segment = &samples[..self.segment_len(samples.len(), sample_rate)];
        let fft_size = segment.len().next_power_of_two().max(self.min_fft_size);
        let window = hann_window(segment.len());
        let window_sum: f64 = window.iter().sum();

        let mut buffer: Vec<Complex<f64>> = segment
            .iter()
            .zip(&window)
            .map(|(&sample, &w)| Complex::new(sample * w, 0.0))
            .collect();
        buffer.resize(fft_size, Complex::new(0.0, 0.0));

        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(fft_size);
        fft.process(&mut buffer);

        let scale = 2.0 / window_sum.max(MAGNITUDE_EPSILON);
        let magnitudes = buffer[..fft_size / 2 + 1]
            .iter()
            .map(|c| c.norm() * scale)
            .collect();

        Ok(Spectrum {
            magnitudes,
            sample_rate,
            fft_size,
        })
    }
}

/// Symmetric Hann window; a single sample gets unit weight
fn hann_window(len: usize) -> Vec<f64> {
    if len < 2 {
        return vec![1.0; len];
    }

    let denom = (len - 1) as f64;
    (0..len)
        .map(|i| 0.5 * (1.0 - ((2.0 * std::f64::consts::PI * i as f64) / denom).cos()))
        .collect()
}
