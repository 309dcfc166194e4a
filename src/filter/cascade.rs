// Cascade module - zero-phase notch application
//
// Each FilterSpec runs the Direct Form I recurrence forward over the whole
// channel, then a fresh recurrence backward over that output. Iterating the
// slice in reverse in place is the same as reverse → filter → reverse, so the
// net phase shift is zero and no time delay is introduced. Filters run in the
// order given, each consuming the previous output. Samples are saturated to
// [-1.0, 1.0] after the last filter.

use biquad::{Biquad, DirectForm1};

use crate::audio::AudioBuffer;
use crate::error::DspError;
use crate::filter::notch::FilterSpec;

/// Channels shorter than this pass through untouched; the recurrence needs
/// two prior samples.
pub const MIN_FILTER_LEN: usize = 3;

/// Apply one notch forward then backward over `samples` in place
pub fn apply_zero_phase(samples: &mut [f64], spec: &FilterSpec) {
    if samples.len() < MIN_FILTER_LEN {
        return;
    }

    let mut forward = DirectForm1::<f64>::new(spec.coefficients());
    for sample in samples.iter_mut() {
        *sample = forward.run(*sample);
    }

    let mut backward = DirectForm1::<f64>::new(spec.coefficients());
    for sample in samples.iter_mut().rev() {
        *sample = backward.run(*sample);
    }
}

/// Saturate samples to [-1.0, 1.0], returning how many were out of range
pub fn clip_in_place(samples: &mut [f64]) -> usize {
    let mut clipped = 0;
    for sample in samples.iter_mut() {
        if *sample > 1.0 || *sample < -1.0 {
            *sample = sample.clamp(-1.0, 1.0);
            clipped += 1;
        }
    }
    clipped
}

/// Run every spec, in order, zero-phase over one channel of `buffer`
///
/// # Returns
/// Number of samples clipped after the cascade. Channels shorter than
/// [`MIN_FILTER_LEN`] are left bit-identical and report zero.
///
/// # Errors
/// `DspError::InvalidBuffer` if `channel` is out of range.
pub fn apply_cascade(
    buffer: &mut AudioBuffer,
    channel: usize,
    specs: &[FilterSpec],
) -> Result<usize, DspError> {
    let channel_count = buffer.channel_count();
    let samples = buffer
        .channel_mut(channel)
        .ok_or_else(|| DspError::InvalidBuffer {
            reason: format!(
                "channel {} out of range for {} channel(s)",
                channel, channel_count
            ),
        })?;

    if samples.len() < MIN_FILTER_LEN {
        return Ok(0);
    }

    for spec in specs {
        apply_zero_phase(samples, spec);
    }

    Ok(clip_in_place(samples))
}
