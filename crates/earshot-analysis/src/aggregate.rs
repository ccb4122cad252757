//! Response assembly: pure composition of the three stage results.

use earshot_core::{AnalysisResponse, DiarizationResult, EmotionResult, TranscriptionResult};

/// Compose the three results into the unified response record.
///
/// Pure, infallible: inputs were already validated by their producing
/// stages, and no cross-stage time reconciliation happens here: segments
/// from different stages may legitimately disagree on boundaries.
pub fn assemble(
    transcription: TranscriptionResult,
    emotions: EmotionResult,
    speakers: DiarizationResult,
) -> AnalysisResponse {
    AnalysisResponse {
        transcription,
        emotions,
        speakers,
    }
}
