//! HTTP error rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use earshot_core::{AnalysisError, AudioError, StageError};

/// Anything that can fail while serving a request.
///
/// The external contract is deliberately flat: every failure renders as a
/// 500 with a plain-text detail. Callers cannot programmatically tell a bad
/// upload from a crashed model without parsing the message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The upload itself was unusable (missing field, oversize, malformed
    /// multipart).
    #[error("invalid upload: {0}")]
    Upload(String),

    /// The analysis pipeline failed.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Internal bookkeeping failure (task join, ingest worker).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AudioError> for ApiError {
    fn from(e: AudioError) -> Self {
        ApiError::Analysis(e.into())
    }
}

impl From<StageError> for ApiError {
    fn from(e: StageError) -> Self {
        ApiError::Analysis(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use earshot_core::StageKind;

    #[test]
    fn every_variant_maps_to_500() {
        let errors: Vec<ApiError> = vec![
            ApiError::Upload("missing file field".into()),
            AudioError::Silence.into(),
            StageError::model(StageKind::Emotion, "boom").into(),
            ApiError::Internal("join".into()),
        ];
        for e in errors {
            let resp = e.into_response();
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn message_carries_stage_detail() {
        let e: ApiError = StageError::model(StageKind::Diarization, "no turns").into();
        let msg = e.to_string();
        assert!(msg.contains("diarization"), "{msg}");
        assert!(msg.contains("no turns"), "{msg}");
    }
}
