//! Opaque model capability traits and their raw payload shapes.
//!
//! The three back ends differ in every internal detail but share one shape:
//! consume a signal, produce a typed payload, possibly fail. These traits
//! are that boundary; nothing else in the crate knows whether a model runs
//! in-process, on a GPU, or behind an HTTP sidecar.
//!
//! Concurrency contract: implementations are invoked concurrently across
//! requests and stages. An implementation that is not safe for concurrent
//! inference must serialize internally (e.g. hold its session behind a
//! `Mutex`); the orchestrator does not do it for them.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use earshot_core::{Signal, StageErrorKind};

/// A model-side failure, before it is tagged with the owning stage.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ModelError {
    /// Coarse classification, carried into the resulting `StageError`.
    pub kind: StageErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl ModelError {
    /// Inference or payload failure.
    pub fn model(message: impl Into<String>) -> Self {
        Self {
            kind: StageErrorKind::Model,
            message: message.into(),
        }
    }

    /// The model rejected the input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: StageErrorKind::InvalidInput,
            message: message.into(),
        }
    }

    /// Transport/resource exhaustion.
    pub fn resource(message: impl Into<String>) -> Self {
        Self {
            kind: StageErrorKind::Resource,
            message: message.into(),
        }
    }
}

/// A word as the speech model reports it. Confidence is optional; the
/// adapter resolves missing values.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWord {
    /// Word text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Per-word confidence, if the model reports one.
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// One segment of the speech model's nested output.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTranscriptSegment {
    /// Word-level timestamps within this segment, possibly unordered.
    #[serde(default)]
    pub words: Vec<RawWord>,
}

/// The speech model's full output, still in its nested shape.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTranscript {
    /// Full transcribed text.
    pub text: String,
    /// Detected language, if the model reports one.
    #[serde(default)]
    pub language: Option<String>,
    /// Nested segments carrying word timestamps.
    #[serde(default)]
    pub segments: Vec<RawTranscriptSegment>,
    /// Overall confidence, if reported.
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// One label/score pair from the emotion classifier.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelScore {
    /// Emotion label.
    pub label: String,
    /// Non-negative probability-like score.
    pub score: f32,
}

/// One raw speaker turn from the diarization model, before merging.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTurn {
    /// Opaque speaker identity.
    pub speaker_id: String,
    /// Turn start in seconds.
    pub start_time: f64,
    /// Turn end in seconds.
    pub end_time: f64,
    /// Turn confidence, if the model reports one.
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Speech-to-text capability.
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Transcribe a full signal. The language hint is advisory; the model
    /// may ignore it and auto-detect.
    async fn transcribe(
        &self,
        signal: &Signal,
        language: Option<&str>,
    ) -> Result<RawTranscript, ModelError>;
}

/// Emotion classification capability. Accepts only short clips; callers
/// window the signal first.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Classify one clip, returning the full label distribution.
    async fn classify(&self, clip: &[f32], sample_rate: u32) -> Result<Vec<LabelScore>, ModelError>;
}

/// Speaker diarization capability.
#[async_trait]
pub trait SpeakerModel: Send + Sync {
    /// Attribute regions of the signal to speaker identities. Turns come
    /// back in chronological order but may contain spurious micro-gaps.
    async fn diarize(&self, signal: &Signal) -> Result<Vec<RawTurn>, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_transcript_deserializes_whisper_shape() {
        let json = r#"{
            "text": "hello world",
            "language": "en",
            "segments": [
                {"words": [
                    {"text": "hello", "start": 0.0, "end": 0.4, "confidence": 0.95},
                    {"text": "world", "start": 0.5, "end": 0.9}
                ]}
            ]
        }"#;
        let t: RawTranscript = serde_json::from_str(json).unwrap();
        assert_eq!(t.text, "hello world");
        assert_eq!(t.segments[0].words.len(), 2);
        assert_eq!(t.segments[0].words[1].confidence, None);
        assert_eq!(t.confidence, None);
    }

    #[test]
    fn raw_transcript_tolerates_missing_segments() {
        let t: RawTranscript = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert!(t.segments.is_empty());
        assert_eq!(t.language, None);
    }

    #[test]
    fn raw_turn_without_confidence() {
        let turn: RawTurn = serde_json::from_str(
            r#"{"speaker_id": "SPEAKER_00", "start_time": 0.0, "end_time": 2.0}"#,
        )
        .unwrap();
        assert_eq!(turn.confidence, None);
    }
}
