//! Error hierarchy for the analysis pipeline.
//!
//! - [`AudioError`]: ingestion failures (decode, empty, silence)
//! - [`StageError`]: a specific analysis stage failed, tagged with which
//!   stage and a coarse failure kind
//! - [`AnalysisError`]: top-level union surfaced at the request boundary
//!
//! Nothing here is retried locally; errors propagate to the HTTP layer,
//! which renders them as a 500 with the display message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies one of the three analysis capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Speech-to-text.
    Transcription,
    /// Emotion classification.
    Emotion,
    /// Speaker diarization.
    Diarization,
}

impl StageKind {
    /// All stages, in the order they are reported.
    pub const ALL: [StageKind; 3] = [
        StageKind::Transcription,
        StageKind::Emotion,
        StageKind::Diarization,
    ];

    /// Stable lowercase name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            StageKind::Transcription => "transcription",
            StageKind::Emotion => "emotion",
            StageKind::Diarization => "diarization",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Failures while turning uploaded bytes into a [`crate::Signal`].
#[derive(Debug, Error)]
pub enum AudioError {
    /// The byte stream is not a decodable audio container.
    #[error("audio decode error: {0}")]
    Decode(String),

    /// The container decoded to zero samples.
    #[error("decoded signal is empty")]
    EmptySignal,

    /// Every sample is zero; peak normalization is undefined.
    #[error("decoded signal is pure silence")]
    Silence,

    /// Resampling to the target rate failed.
    #[error("resample error: {0}")]
    Resample(String),
}

/// Coarse classification of a stage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageErrorKind {
    /// The underlying model errored or returned an unusable payload.
    Model,
    /// The stage rejected the input (bad shape, unsupported content).
    InvalidInput,
    /// Resource exhaustion (connection, memory, task join).
    Resource,
}

impl StageErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            StageErrorKind::Model => "model",
            StageErrorKind::InvalidInput => "invalid input",
            StageErrorKind::Resource => "resource",
        }
    }
}

/// A specific analysis stage failed.
///
/// Stages never surface unstructured failures; anything that goes wrong
/// inside an adapter or its model back end is wrapped in this type.
#[derive(Debug, Error)]
#[error("{stage} stage failed ({}): {message}", kind.as_str())]
pub struct StageError {
    /// Which stage failed.
    pub stage: StageKind,
    /// Coarse failure classification.
    pub kind: StageErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl StageError {
    /// Model-side failure.
    pub fn model(stage: StageKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind: StageErrorKind::Model,
            message: message.into(),
        }
    }

    /// Input rejected by the stage.
    pub fn invalid_input(stage: StageKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind: StageErrorKind::InvalidInput,
            message: message.into(),
        }
    }

    /// Resource exhaustion.
    pub fn resource(stage: StageKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind: StageErrorKind::Resource,
            message: message.into(),
        }
    }
}

/// Top-level error for an analysis request.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Ingestion failed.
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// One of the stages failed.
    #[error(transparent)]
    Stage(#[from] StageError),

    /// Reserved for future cross-result consistency checks; the aggregator
    /// is currently a pure composer and never produces this.
    #[error("aggregation error: {0}")]
    Aggregation(String),
}
