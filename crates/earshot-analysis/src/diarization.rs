//! Diarization stage: merges spurious micro-gaps out of raw speaker turns.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use earshot_core::{
    DiarizationResult, Signal, SpeakerSegment, StageError, StageKind, UNKNOWN_CONFIDENCE,
};

use crate::model::SpeakerModel;
use crate::stage::{AnalysisStage, StageOutput};

/// Default maximum gap (seconds) between same-speaker turns that still get
/// merged into one continuous turn.
pub const DEFAULT_MERGE_GAP_SECS: f64 = 0.5;

/// Adapter over a [`SpeakerModel`].
///
/// Raw models tend to split one continuous utterance at every short pause;
/// this adapter collapses consecutive same-speaker turns whose gap is at
/// most the configured threshold.
pub struct DiarizationStage {
    model: Arc<dyn SpeakerModel>,
    merge_gap_secs: f64,
}

impl DiarizationStage {
    /// Wrap a speaker model with the default merge threshold.
    pub fn new(model: Arc<dyn SpeakerModel>) -> Self {
        Self::with_merge_gap(model, DEFAULT_MERGE_GAP_SECS)
    }

    /// Wrap a speaker model with an explicit merge threshold.
    pub fn with_merge_gap(model: Arc<dyn SpeakerModel>, merge_gap_secs: f64) -> Self {
        Self {
            model,
            merge_gap_secs,
        }
    }
}

#[async_trait]
impl AnalysisStage for DiarizationStage {
    fn kind(&self) -> StageKind {
        StageKind::Diarization
    }

    async fn analyze(
        &self,
        signal: &Signal,
        _language: Option<&str>,
    ) -> Result<StageOutput, StageError> {
        let turns = self.model.diarize(signal).await.map_err(|e| StageError {
            stage: StageKind::Diarization,
            kind: e.kind,
            message: e.message,
        })?;

        let raw: Vec<SpeakerSegment> = turns
            .into_iter()
            .map(|t| SpeakerSegment {
                speaker_id: t.speaker_id,
                start_time: t.start_time,
                end_time: t.end_time,
                confidence: t.confidence.unwrap_or(UNKNOWN_CONFIDENCE),
            })
            .collect();

        let raw_count = raw.len();
        let segments = merge_segments(raw, self.merge_gap_secs);
        let num_speakers = distinct_speakers(&segments);
        debug!(
            raw_turns = raw_count,
            merged = segments.len(),
            num_speakers,
            "diarization complete"
        );

        Ok(StageOutput::Diarization(DiarizationResult {
            segments,
            num_speakers,
        }))
    }
}

/// Merge consecutive same-speaker segments whose gap is at most `gap_secs`.
///
/// Single left-to-right pass: carry one open segment, extend its end when
/// the next turn matches speaker and gap, otherwise close it and open a new
/// one; the final open segment is always flushed. Idempotent: running it
/// over already-merged output changes nothing. The open segment keeps its
/// own confidence; absorbed turns only contribute their end time.
pub fn merge_segments(segments: Vec<SpeakerSegment>, gap_secs: f64) -> Vec<SpeakerSegment> {
    let mut segments = segments;
    segments.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    let mut iter = segments.into_iter();
    let Some(mut current) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    for next in iter {
        let same_speaker = next.speaker_id == current.speaker_id;
        let gap = next.start_time - current.end_time;
        if same_speaker && gap <= gap_secs {
            // A turn fully contained in the current one must not shrink it.
            current.end_time = current.end_time.max(next.end_time);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);
    merged
}

/// Count distinct speaker identities.
fn distinct_speakers(segments: &[SpeakerSegment]) -> usize {
    segments
        .iter()
        .map(|s| s.speaker_id.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}
