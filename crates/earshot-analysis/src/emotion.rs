//! Emotion stage: windows the signal and majority-votes a dominant label.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use earshot_core::{EmotionResult, EmotionSegment, Signal, StageError, StageKind};

use crate::model::{EmotionClassifier, LabelScore};
use crate::stage::{AnalysisStage, StageOutput};

/// Window length fed to the classifier, in seconds.
pub const WINDOW_SECS: f64 = 3.0;
/// Hop between window starts, in seconds (50% overlap).
pub const HOP_SECS: f64 = 1.5;

/// Adapter over an [`EmotionClassifier`].
///
/// The classifier only accepts short clips, so the signal is split into
/// fixed-length overlapping windows first. The final window is truncated to
/// the remaining tail, never padded, and a signal shorter than one window
/// is classified whole.
pub struct EmotionStage {
    classifier: Arc<dyn EmotionClassifier>,
}

impl EmotionStage {
    /// Wrap an emotion classifier.
    pub fn new(classifier: Arc<dyn EmotionClassifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl AnalysisStage for EmotionStage {
    fn kind(&self) -> StageKind {
        StageKind::Emotion
    }

    async fn analyze(
        &self,
        signal: &Signal,
        _language: Option<&str>,
    ) -> Result<StageOutput, StageError> {
        let rate = signal.sample_rate();
        let bounds = window_bounds(signal.len(), rate);
        debug!(windows = bounds.len(), "classifying emotion windows");

        let mut segments = Vec::with_capacity(bounds.len());
        for (start, end) in bounds {
            let clip = &signal.samples()[start..end];
            let scores = self
                .classifier
                .classify(clip, rate)
                .await
                .map_err(|e| StageError {
                    stage: StageKind::Emotion,
                    kind: e.kind,
                    message: e.message,
                })?;

            segments.push(segment_from_scores(
                scores,
                start as f64 / f64::from(rate),
                end as f64 / f64::from(rate),
            )?);
        }

        let dominant_emotion = dominant_emotion(&segments);
        Ok(StageOutput::Emotion(EmotionResult {
            segments,
            dominant_emotion,
        }))
    }
}

/// Window boundaries in samples: fixed length, fixed hop, final window
/// truncated to the signal tail. Always yields at least one window for a
/// non-empty signal.
fn window_bounds(len: usize, sample_rate: u32) -> Vec<(usize, usize)> {
    let window = (WINDOW_SECS * f64::from(sample_rate)) as usize;
    let hop = (HOP_SECS * f64::from(sample_rate)) as usize;

    let mut bounds = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + window).min(len);
        bounds.push((start, end));
        if end == len {
            break;
        }
        start += hop;
    }
    bounds
}

/// Build one segment from a classifier distribution.
///
/// The top label is recomputed here rather than trusted positionally, so
/// the `emotion`-is-argmax invariant holds no matter how the model orders
/// its output.
fn segment_from_scores(
    scores: Vec<LabelScore>,
    start_time: f64,
    end_time: f64,
) -> Result<EmotionSegment, StageError> {
    let top = scores
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| {
            StageError::model(StageKind::Emotion, "classifier returned no labels")
        })?;

    let (emotion, confidence) = (top.label.clone(), top.score);
    let all_emotions: BTreeMap<String, f32> =
        scores.into_iter().map(|s| (s.label, s.score)).collect();

    Ok(EmotionSegment {
        start_time,
        end_time,
        emotion,
        confidence,
        all_emotions,
    })
}

/// Majority vote over the segments' top labels.
///
/// Chronological scan; the winner is the first label to reach the maximum
/// count, so earlier segments break ties.
fn dominant_emotion(segments: &[EmotionSegment]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut best: Option<(&str, usize)> = None;

    for segment in segments {
        let count = counts.entry(&segment.emotion).or_insert(0);
        *count += 1;
        if best.is_none_or(|(_, best_count)| *count > best_count) {
            best = Some((&segment.emotion, *count));
        }
    }

    best.map_or_else(|| "unknown".to_owned(), |(label, _)| label.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(emotion: &str) -> EmotionSegment {
        EmotionSegment {
            start_time: 0.0,
            end_time: 3.0,
            emotion: emotion.into(),
            confidence: 0.9,
            all_emotions: BTreeMap::from([(emotion.to_owned(), 0.9)]),
        }
    }

    #[test]
    fn five_second_signal_produces_three_windows() {
        let rate = 16_000;
        let bounds = window_bounds(5 * rate as usize, rate);
        let secs: Vec<(f64, f64)> = bounds
            .iter()
            .map(|&(s, e)| (s as f64 / 16_000.0, e as f64 / 16_000.0))
            .collect();
        assert_eq!(secs, vec![(0.0, 3.0), (1.5, 4.5), (3.0, 5.0)]);
    }

    #[test]
    fn exact_window_length_is_one_window() {
        let bounds = window_bounds(48_000, 16_000);
        assert_eq!(bounds, vec![(0, 48_000)]);
    }

    #[test]
    fn short_signal_still_gets_one_truncated_window() {
        let bounds = window_bounds(8_000, 16_000);
        assert_eq!(bounds, vec![(0, 8_000)]);
    }

    #[test]
    fn final_window_is_truncated_not_padded() {
        // 3.5s: [0, 3.0) then [1.5, 3.5).
        let bounds = window_bounds(56_000, 16_000);
        assert_eq!(bounds, vec![(0, 48_000), (24_000, 56_000)]);
    }

    #[test]
    fn dominant_is_majority() {
        let segments = vec![seg("happy"), seg("sad"), seg("happy")];
        assert_eq!(dominant_emotion(&segments), "happy");
    }

    #[test]
    fn tie_goes_to_first_label_reaching_the_max() {
        let segments = vec![seg("happy"), seg("sad")];
        assert_eq!(dominant_emotion(&segments), "happy");

        let segments = vec![seg("sad"), seg("happy"), seg("happy")];
        assert_eq!(dominant_emotion(&segments), "happy");
    }

    #[test]
    fn segment_top_label_is_argmax_regardless_of_order() {
        let scores = vec![
            LabelScore {
                label: "neutral".into(),
                score: 0.2,
            },
            LabelScore {
                label: "angry".into(),
                score: 0.7,
            },
            LabelScore {
                label: "happy".into(),
                score: 0.1,
            },
        ];
        let segment = segment_from_scores(scores, 0.0, 3.0).unwrap();
        assert_eq!(segment.emotion, "angry");
        assert_eq!(segment.confidence, 0.7);
        assert_eq!(segment.all_emotions.len(), 3);
        assert_eq!(segment.all_emotions["angry"], 0.7);
    }

    #[test]
    fn empty_distribution_is_a_stage_error() {
        let err = segment_from_scores(vec![], 0.0, 3.0).unwrap_err();
        assert_eq!(err.stage, StageKind::Emotion);
    }
}
