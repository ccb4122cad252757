//! Request handlers for the analysis endpoints.
//!
//! Every endpoint follows the same shape: pull the upload out of the
//! multipart body, run ingestion on a blocking thread, fan out to the
//! enabled stages, and serialize the typed result. Any failure along the
//! way surfaces as a 500 with a plain-text reason.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::Json;
use earshot_core::{
    AnalysisResponse, DiarizationResult, EmotionResult, Signal, StageKind, TranscriptionResult,
};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::server::AppState;

/// A parsed multipart upload: the audio bytes plus the optional hints
/// that ride along with them.
struct Upload {
    bytes: Vec<u8>,
    content_type: Option<String>,
    language: Option<String>,
}

/// Pull the `file` field (required) and `language` field (optional) out
/// of the multipart body. Unknown fields are skipped.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut bytes = None;
    let mut content_type = None;
    let mut language = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Upload(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                content_type = field.content_type().map(ToOwned::to_owned);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Upload(format!("failed to read file field: {e}")))?;
                bytes = Some(data.to_vec());
            }
            Some("language") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Upload(format!("failed to read language field: {e}")))?;
                if !text.trim().is_empty() {
                    language = Some(text);
                }
            }
            _ => {}
        }
    }

    let bytes = bytes.ok_or_else(|| ApiError::Upload("missing file field".into()))?;
    Ok(Upload {
        bytes,
        content_type,
        language,
    })
}

/// Decode and normalize the upload on a blocking thread; symphonia and
/// rubato are CPU-bound and must stay off the async runtime.
async fn ingest(state: &AppState, upload: &Upload) -> Result<Signal, ApiError> {
    let ingestor = state.ingestor.clone();
    let raw = upload.bytes.clone();
    let content_type = upload.content_type.clone();
    let signal = tokio::task::spawn_blocking(move || ingestor.process(&raw, content_type.as_deref()))
        .await
        .map_err(|e| ApiError::Internal(format!("ingestion task failed: {e}")))??;
    debug!(
        samples = signal.len(),
        duration_secs = signal.duration_secs(),
        "audio ingested"
    );
    Ok(signal)
}

fn missing_outcome(kind: StageKind) -> ApiError {
    ApiError::Internal(format!("{kind} stage produced no outcome"))
}

/// POST /analyze: run every stage and return the combined record.
///
/// All-or-nothing: if any stage failed, the whole request fails and no
/// partial result is returned.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let upload = read_upload(multipart).await?;
    let signal = ingest(&state, &upload).await?;

    let mut outcomes = state
        .orchestrator
        .run(Arc::new(signal), upload.language, &StageKind::ALL)
        .await;

    let transcription = outcomes
        .take_transcription()
        .ok_or_else(|| missing_outcome(StageKind::Transcription))??;
    let emotions = outcomes
        .take_emotion()
        .ok_or_else(|| missing_outcome(StageKind::Emotion))??;
    let speakers = outcomes
        .take_diarization()
        .ok_or_else(|| missing_outcome(StageKind::Diarization))??;

    info!(
        language = %transcription.language,
        num_speakers = speakers.num_speakers,
        dominant_emotion = %emotions.dominant_emotion,
        "analysis complete"
    );
    Ok(Json(earshot_analysis::assemble(
        transcription,
        emotions,
        speakers,
    )))
}

/// POST /transcribe: transcription stage only.
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TranscriptionResult>, ApiError> {
    let upload = read_upload(multipart).await?;
    let signal = ingest(&state, &upload).await?;

    let mut outcomes = state
        .orchestrator
        .run(
            Arc::new(signal),
            upload.language,
            &[StageKind::Transcription],
        )
        .await;
    let transcription = outcomes
        .take_transcription()
        .ok_or_else(|| missing_outcome(StageKind::Transcription))??;
    Ok(Json(transcription))
}

/// POST /emotions: emotion stage only.
pub async fn emotions(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EmotionResult>, ApiError> {
    let upload = read_upload(multipart).await?;
    let signal = ingest(&state, &upload).await?;

    let mut outcomes = state
        .orchestrator
        .run(Arc::new(signal), upload.language, &[StageKind::Emotion])
        .await;
    let emotions = outcomes
        .take_emotion()
        .ok_or_else(|| missing_outcome(StageKind::Emotion))??;
    Ok(Json(emotions))
}

/// POST /diarize: diarization stage only.
pub async fn diarize(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<DiarizationResult>, ApiError> {
    let upload = read_upload(multipart).await?;
    let signal = ingest(&state, &upload).await?;

    let mut outcomes = state
        .orchestrator
        .run(Arc::new(signal), upload.language, &[StageKind::Diarization])
        .await;
    let speakers = outcomes
        .take_diarization()
        .ok_or_else(|| missing_outcome(StageKind::Diarization))??;
    Ok(Json(speakers))
}
