//! Concurrent fan-out of one signal to all enabled stages.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use earshot_core::{Signal, StageError, StageKind};

use crate::stage::{AnalysisStage, StageOutput};

/// Every stage's tagged outcome for one request.
///
/// The orchestrator never discards a success because a sibling failed;
/// whether partial success is acceptable is the caller's decision, made at
/// response assembly, not baked in here.
#[derive(Debug)]
pub struct StageOutcomes {
    outcomes: HashMap<StageKind, Result<StageOutput, StageError>>,
}

impl StageOutcomes {
    /// Outcome for one stage, if it was enabled.
    pub fn get(&self, kind: StageKind) -> Option<&Result<StageOutput, StageError>> {
        self.outcomes.get(&kind)
    }

    /// Remove and return one stage's outcome.
    pub fn take(&mut self, kind: StageKind) -> Option<Result<StageOutput, StageError>> {
        self.outcomes.remove(&kind)
    }

    /// Number of enabled stages.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether no stage was enabled.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Remove the transcription outcome, if that stage was enabled.
    pub fn take_transcription(
        &mut self,
    ) -> Option<Result<earshot_core::TranscriptionResult, StageError>> {
        self.take(StageKind::Transcription)
            .map(|r| r.map(|o| o.into_transcription().expect("tagged transcription output")))
    }

    /// Remove the emotion outcome, if that stage was enabled.
    pub fn take_emotion(&mut self) -> Option<Result<earshot_core::EmotionResult, StageError>> {
        self.take(StageKind::Emotion)
            .map(|r| r.map(|o| o.into_emotion().expect("tagged emotion output")))
    }

    /// Remove the diarization outcome, if that stage was enabled.
    pub fn take_diarization(
        &mut self,
    ) -> Option<Result<earshot_core::DiarizationResult, StageError>> {
        self.take(StageKind::Diarization)
            .map(|r| r.map(|o| o.into_diarization().expect("tagged diarization output")))
    }

    /// All-or-nothing view: every enabled stage's output, or the first
    /// failure in stage-declaration order.
    ///
    /// This is where the service's current "one failure discards everything"
    /// policy lives; completed sibling results are dropped here, not in the
    /// orchestrator.
    pub fn into_complete(mut self) -> Result<Vec<StageOutput>, StageError> {
        let mut outputs = Vec::with_capacity(self.outcomes.len());
        for kind in StageKind::ALL {
            match self.outcomes.remove(&kind) {
                Some(Ok(output)) => outputs.push(output),
                Some(Err(e)) => return Err(e),
                None => {}
            }
        }
        Ok(outputs)
    }
}

/// Fans one immutable signal out to independent stage tasks.
///
/// Stages run as separate tokio tasks against the same `Arc<Signal>`; no
/// start or completion ordering is guaranteed between them. The caller is
/// suspended until every enabled stage has finished. Failed siblings are
/// not cancelled (their work is simply discarded) and no per-stage timeout
/// is enforced.
pub struct Orchestrator {
    stages: Vec<Arc<dyn AnalysisStage>>,
}

impl Orchestrator {
    /// Build an orchestrator over the configured stages.
    pub fn new(stages: Vec<Arc<dyn AnalysisStage>>) -> Self {
        Self { stages }
    }

    /// Run every enabled stage concurrently and collect all outcomes.
    pub async fn run(
        &self,
        signal: Arc<Signal>,
        language: Option<String>,
        enabled: &[StageKind],
    ) -> StageOutcomes {
        let mut tasks = Vec::with_capacity(enabled.len());
        for stage in &self.stages {
            if !enabled.contains(&stage.kind()) {
                continue;
            }
            let kind = stage.kind();
            let stage = Arc::clone(stage);
            let signal = Arc::clone(&signal);
            let language = language.clone();
            let handle = tokio::spawn(async move {
                stage.analyze(&signal, language.as_deref()).await
            });
            tasks.push((kind, handle));
        }

        let mut outcomes = HashMap::with_capacity(tasks.len());
        for (kind, handle) in tasks {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    warn!(stage = %kind, error = %e, "stage task aborted");
                    Err(StageError::resource(
                        kind,
                        format!("stage task failed to complete: {e}"),
                    ))
                }
            };
            if let Err(ref e) = outcome {
                warn!(stage = %kind, error = %e, "stage failed");
            } else {
                debug!(stage = %kind, "stage complete");
            }
            let _ = outcomes.insert(kind, outcome);
        }

        StageOutcomes { outcomes }
    }
}
