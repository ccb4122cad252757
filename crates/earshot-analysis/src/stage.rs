//! The uniform stage contract the orchestrator fans out over.

use async_trait::async_trait;

use earshot_core::{
    DiarizationResult, EmotionResult, Signal, StageError, StageKind, TranscriptionResult,
};

/// Output of one analysis stage, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    /// Transcription stage output.
    Transcription(TranscriptionResult),
    /// Emotion stage output.
    Emotion(EmotionResult),
    /// Diarization stage output.
    Diarization(DiarizationResult),
}

impl StageOutput {
    /// Which stage produced this output.
    pub fn kind(&self) -> StageKind {
        match self {
            StageOutput::Transcription(_) => StageKind::Transcription,
            StageOutput::Emotion(_) => StageKind::Emotion,
            StageOutput::Diarization(_) => StageKind::Diarization,
        }
    }

    /// Unwrap a transcription result; `None` for other stages.
    pub fn into_transcription(self) -> Option<TranscriptionResult> {
        match self {
            StageOutput::Transcription(r) => Some(r),
            _ => None,
        }
    }

    /// Unwrap an emotion result; `None` for other stages.
    pub fn into_emotion(self) -> Option<EmotionResult> {
        match self {
            StageOutput::Emotion(r) => Some(r),
            _ => None,
        }
    }

    /// Unwrap a diarization result; `None` for other stages.
    pub fn into_diarization(self) -> Option<DiarizationResult> {
        match self {
            StageOutput::Diarization(r) => Some(r),
            _ => None,
        }
    }
}

/// One independent analysis capability behind a uniform contract.
///
/// Stages are stateless with respect to request data: they may hold a
/// loaded model as shared state across requests, but must not retain or
/// mutate the input signal. Output is deterministic up to the model's own
/// inference nondeterminism. All failures come back as a structured
/// [`StageError`]; a stage never panics on bad model output.
#[async_trait]
pub trait AnalysisStage: Send + Sync {
    /// Which stage this is.
    fn kind(&self) -> StageKind;

    /// Analyze the signal. The language hint is only meaningful to the
    /// transcription stage; others ignore it.
    async fn analyze(
        &self,
        signal: &Signal,
        language: Option<&str>,
    ) -> Result<StageOutput, StageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use earshot_core::EmotionResult;

    #[test]
    fn output_kind_matches_variant() {
        let out = StageOutput::Emotion(EmotionResult {
            segments: vec![],
            dominant_emotion: "neutral".into(),
        });
        assert_eq!(out.kind(), StageKind::Emotion);
        assert!(out.clone().into_transcription().is_none());
        assert!(out.into_emotion().is_some());
    }
}
