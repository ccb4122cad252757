//! The ingestor: uploaded bytes → normalized [`Signal`].

use earshot_core::{AudioError, Signal, TARGET_SAMPLE_RATE};
use tracing::debug;

use crate::decode::{decode, downmix_to_mono};
use crate::resample::resample;

/// Decodes, downmixes, resamples, and peak-normalizes uploaded audio.
///
/// Stateless; one instance is shared by all requests. Consumes the input
/// bytes once and has no other side effects.
#[derive(Debug, Clone)]
pub struct AudioIngestor {
    target_rate: u32,
}

impl Default for AudioIngestor {
    fn default() -> Self {
        Self {
            target_rate: TARGET_SAMPLE_RATE,
        }
    }
}

impl AudioIngestor {
    /// Ingestor producing signals at a non-default rate (tests only need
    /// this; the service always uses [`TARGET_SAMPLE_RATE`]).
    pub fn with_target_rate(target_rate: u32) -> Self {
        Self { target_rate }
    }

    /// Turn raw upload bytes into a normalized signal.
    ///
    /// Fails with [`AudioError::Decode`] for undecodable input,
    /// [`AudioError::EmptySignal`] when the container decodes to zero
    /// samples, and [`AudioError::Silence`] when the peak amplitude is zero
    /// (normalizing would divide by zero).
    pub fn process(&self, raw: &[u8], content_type: Option<&str>) -> Result<Signal, AudioError> {
        let decoded = decode(raw, content_type)?;
        debug!(
            sample_rate = decoded.sample_rate,
            channels = decoded.channels,
            frames = decoded.interleaved.len() / decoded.channels.max(1),
            "decoded upload"
        );

        let mono = downmix_to_mono(&decoded.interleaved, decoded.channels);
        if mono.is_empty() {
            return Err(AudioError::EmptySignal);
        }

        let resampled = if decoded.sample_rate == self.target_rate {
            mono
        } else {
            resample(&mono, decoded.sample_rate, self.target_rate)?
        };
        if resampled.is_empty() {
            return Err(AudioError::EmptySignal);
        }

        let normalized = peak_normalize(resampled)?;
        Ok(Signal::new(normalized, self.target_rate))
    }
}

/// Scale samples so the peak absolute value is exactly 1.0, preserving sign.
///
/// Peak normalization, not RMS/loudness: recordings come out with a
/// consistent peak, not a consistent loudness.
fn peak_normalize(mut samples: Vec<f32>) -> Result<Vec<f32>, AudioError> {
    let peak = samples.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
    if peak == 0.0 {
        return Err(AudioError::Silence);
    }
    for s in &mut samples {
        *s /= peak;
    }
    Ok(samples)
}
