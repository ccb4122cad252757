//! The normalized audio signal shared by all analysis stages.

/// Sample rate every ingested signal is converted to.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// A mono, peak-normalized audio signal at [`TARGET_SAMPLE_RATE`].
///
/// Created once per request by the ingestor and never mutated afterwards:
/// stages receive it behind an `Arc` and read it concurrently. Invariants
/// upheld by the ingestor (not re-checked here):
///
/// - at least one sample
/// - `max(|sample|) == 1.0` (peak normalization, not loudness; callers must
///   not assume consistent loudness across recordings)
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Signal {
    /// Wrap already-normalized samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        debug_assert!(!samples.is_empty());
        Self {
            samples,
            sample_rate,
        }
    }

    /// The samples, in order.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a signal produced by the ingestor.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}
