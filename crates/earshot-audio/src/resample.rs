//! Band-limited sample rate conversion via rubato.

use earshot_core::AudioError;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Input frames fed to the resampler per call.
const CHUNK_SIZE: usize = 1024;

/// Resample mono audio from `from_rate` to `to_rate`.
///
/// Pure function of its inputs; no resampler state survives the call. The
/// output length is exactly `round(len * to_rate / from_rate)`: the sinc
/// filter's output delay is skipped and the tail is flushed, so the result
/// lines up with the source in time.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioError> {
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let expected = (samples.len() as f64 * ratio).round() as usize;

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, CHUNK_SIZE, 1)
        .map_err(|e| AudioError::Resample(format!("init: {e}")))?;

    let delay = resampler.output_delay();
    let needed = delay + expected;
    let mut output: Vec<f32> = Vec::with_capacity(needed + CHUNK_SIZE);

    let mut chunks = samples.chunks_exact(CHUNK_SIZE);
    for chunk in &mut chunks {
        let out = resampler
            .process(&[chunk], None)
            .map_err(|e| AudioError::Resample(format!("process: {e}")))?;
        output.extend_from_slice(&out[0]);
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let out = resampler
            .process_partial(Some(&[tail]), None)
            .map_err(|e| AudioError::Resample(format!("process tail: {e}")))?;
        output.extend_from_slice(&out[0]);
    }

    // Flush the filter until the delayed frames have all come out.
    while output.len() < needed {
        let out = resampler
            .process_partial::<&[f32]>(None, None)
            .map_err(|e| AudioError::Resample(format!("flush: {e}")))?;
        if out[0].is_empty() {
            break;
        }
        output.extend_from_slice(&out[0]);
    }

    let mut trimmed: Vec<f32> = output.into_iter().skip(delay).take(expected).collect();
    trimmed.resize(expected, 0.0);
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(rate: u32, secs: f64, freq: f32) -> Vec<f32> {
        let n = (f64::from(rate) * secs) as usize;
        (0..n)
            .map(|i| (i as f32 * freq * std::f32::consts::TAU / rate as f32).sin())
            .collect()
    }

    #[test]
    fn identity_rate_is_untouched() {
        let samples = sine(16_000, 0.25, 440.0);
        let out = resample(&samples, 16_000, 16_000).unwrap();
        assert_eq!(out, samples);
    }

    #[test]
    fn downsample_length_is_exact() {
        let samples = sine(48_000, 1.0, 440.0);
        let out = resample(&samples, 48_000, 16_000).unwrap();
        assert_eq!(out.len(), 16_000);
    }

    #[test]
    fn upsample_length_is_exact() {
        let samples = sine(8_000, 0.5, 200.0);
        let out = resample(&samples, 8_000, 16_000).unwrap();
        assert_eq!(out.len(), 8_000);
    }

    #[test]
    fn awkward_ratio_length_is_rounded() {
        // 44.1kHz → 16kHz: 22050 * 16000/44100 = 8000 exactly,
        // 22051 * 16000/44100 = 8000.36… → 8000.
        let samples = sine(44_100, 0.6, 440.0);
        let out = resample(&samples[..22_051], 44_100, 16_000).unwrap();
        assert_eq!(out.len(), 8_000);
    }

    #[test]
    fn downsampled_sine_keeps_amplitude() {
        let samples = sine(48_000, 1.0, 440.0);
        let out = resample(&samples, 48_000, 16_000).unwrap();
        let peak = out.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
        assert!((peak - 1.0).abs() < 0.05, "peak {peak}");
    }
}
