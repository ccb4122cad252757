//! Transcription stage: flattens and orders the speech model's output.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use earshot_core::{
    Signal, StageError, StageKind, TranscriptionResult, WordTimestamp, UNKNOWN_CONFIDENCE,
};

use crate::model::{RawTranscript, SpeechModel};
use crate::stage::{AnalysisStage, StageOutput};

/// Fallback language code when neither the model nor the caller supplies one.
const UNDETERMINED_LANGUAGE: &str = "unknown";

/// Adapter over a [`SpeechModel`].
///
/// The model returns words nested inside segments and in whatever order it
/// likes; this adapter flattens them and re-sorts by start time so the
/// result upholds the word-ordering invariant regardless of the model.
pub struct TranscriptionStage {
    model: Arc<dyn SpeechModel>,
}

impl TranscriptionStage {
    /// Wrap a speech model.
    pub fn new(model: Arc<dyn SpeechModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl AnalysisStage for TranscriptionStage {
    fn kind(&self) -> StageKind {
        StageKind::Transcription
    }

    async fn analyze(
        &self,
        signal: &Signal,
        language: Option<&str>,
    ) -> Result<StageOutput, StageError> {
        let raw = self
            .model
            .transcribe(signal, language)
            .await
            .map_err(|e| StageError {
                stage: StageKind::Transcription,
                kind: e.kind,
                message: e.message,
            })?;

        let result = flatten_transcript(raw, language);
        debug!(
            words = result.words.len(),
            language = %result.language,
            "transcription complete"
        );
        Ok(StageOutput::Transcription(result))
    }
}

/// Flatten the nested segment/word structure into one ordered word list.
///
/// The caller's hint fills in the language only when the model does not
/// detect one itself; the hint is advisory, never binding.
fn flatten_transcript(raw: RawTranscript, language_hint: Option<&str>) -> TranscriptionResult {
    let mut words: Vec<WordTimestamp> = raw
        .segments
        .into_iter()
        .flat_map(|segment| segment.words)
        .map(|w| WordTimestamp {
            text: w.text,
            start: w.start,
            end: w.end,
            confidence: w.confidence.unwrap_or(UNKNOWN_CONFIDENCE),
        })
        .collect();
    words.sort_by(|a, b| a.start.total_cmp(&b.start));

    TranscriptionResult {
        text: raw.text,
        language: raw
            .language
            .or_else(|| language_hint.map(str::to_owned))
            .unwrap_or_else(|| UNDETERMINED_LANGUAGE.to_owned()),
        words,
        confidence: raw.confidence.unwrap_or(UNKNOWN_CONFIDENCE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawTranscriptSegment, RawWord};

    fn word(text: &str, start: f64) -> RawWord {
        RawWord {
            text: text.into(),
            start,
            end: start + 0.3,
            confidence: Some(0.9),
        }
    }

    #[test]
    fn words_from_multiple_segments_are_flattened_and_sorted() {
        let raw = RawTranscript {
            text: "b a c".into(),
            language: Some("en".into()),
            segments: vec![
                RawTranscriptSegment {
                    words: vec![word("b", 1.0), word("a", 0.2)],
                },
                RawTranscriptSegment {
                    words: vec![word("c", 2.0)],
                },
            ],
            confidence: Some(0.8),
        };
        let result = flatten_transcript(raw, None);
        let starts: Vec<f64> = result.words.iter().map(|w| w.start).collect();
        assert_eq!(starts, vec![0.2, 1.0, 2.0]);
        for pair in result.words.windows(2) {
            assert!(pair[0].start <= pair[1].start);
        }
    }

    #[test]
    fn missing_word_confidence_uses_sentinel() {
        let raw = RawTranscript {
            text: "hi".into(),
            language: Some("en".into()),
            segments: vec![RawTranscriptSegment {
                words: vec![RawWord {
                    text: "hi".into(),
                    start: 0.0,
                    end: 0.2,
                    confidence: None,
                }],
            }],
            confidence: None,
        };
        let result = flatten_transcript(raw, None);
        assert_eq!(result.words[0].confidence, UNKNOWN_CONFIDENCE);
        assert_eq!(result.confidence, UNKNOWN_CONFIDENCE);
    }

    #[test]
    fn hint_fills_language_only_when_model_is_silent() {
        let raw = RawTranscript {
            text: "bonjour".into(),
            language: None,
            segments: vec![],
            confidence: None,
        };
        let result = flatten_transcript(raw.clone(), Some("fr"));
        assert_eq!(result.language, "fr");

        let detected = RawTranscript {
            language: Some("de".into()),
            ..raw
        };
        // The hint is advisory: a detected language wins.
        let result = flatten_transcript(detected, Some("fr"));
        assert_eq!(result.language, "de");
    }

    #[test]
    fn no_language_at_all_is_unknown() {
        let raw = RawTranscript {
            text: "".into(),
            language: None,
            segments: vec![],
            confidence: None,
        };
        assert_eq!(flatten_transcript(raw, None).language, "unknown");
    }
}
