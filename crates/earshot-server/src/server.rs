//! Router and shared state for the Earshot service.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use earshot_analysis::sidecar::{
    SidecarEmotionClassifier, SidecarSpeakerModel, SidecarSpeechModel,
};
use earshot_analysis::{
    AnalysisStage, DiarizationStage, EmotionStage, Orchestrator, TranscriptionStage,
};
use earshot_audio::AudioIngestor;

use crate::config::Config;
use crate::handlers;
use crate::health::{self, HealthResponse};

/// Shared state accessible from axum handlers.
///
/// The ingestor and stages are created once at startup and reused by every
/// request; per-request data never lands here.
#[derive(Clone)]
pub struct AppState {
    /// Upload decoder/normalizer.
    pub ingestor: AudioIngestor,
    /// Stage fan-out.
    pub orchestrator: Arc<Orchestrator>,
    /// When the server started.
    pub start_time: Instant,
}

/// The Earshot HTTP server.
pub struct EarshotServer {
    config: Config,
    state: AppState,
}

impl EarshotServer {
    /// Server over an explicit set of stages (tests inject mocks here).
    pub fn new(config: Config, stages: Vec<Arc<dyn AnalysisStage>>) -> Self {
        let state = AppState {
            ingestor: AudioIngestor::default(),
            orchestrator: Arc::new(Orchestrator::new(stages)),
            start_time: Instant::now(),
        };
        Self { config, state }
    }

    /// Server wired to the sidecar model back ends from `config`.
    pub fn from_config(config: Config) -> Self {
        let stages = sidecar_stages(&config);
        Self::new(config, stages)
    }

    /// The server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the axum router with all routes and layers.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/analyze", post(handlers::analyze))
            .route("/transcribe", post(handlers::transcribe))
            .route("/emotions", post(handlers::emotions))
            .route("/diarize", post(handlers::diarize))
            .route("/health", get(health_handler))
            .layer(DefaultBodyLimit::max(self.config.max_upload_bytes))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }
}

/// Build the three production stages against their HTTP sidecars.
pub fn sidecar_stages(config: &Config) -> Vec<Arc<dyn AnalysisStage>> {
    vec![
        Arc::new(TranscriptionStage::new(Arc::new(SidecarSpeechModel::new(
            config.transcription_url.clone(),
        )))),
        Arc::new(EmotionStage::new(Arc::new(SidecarEmotionClassifier::new(
            config.emotion_url.clone(),
        )))),
        Arc::new(DiarizationStage::with_merge_gap(
            Arc::new(SidecarSpeakerModel::new(config.diarization_url.clone())),
            config.merge_gap_secs,
        )),
    ]
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn make_server() -> EarshotServer {
        EarshotServer::from_config(Config::default())
    }

    #[test]
    fn config_is_kept() {
        let server = make_server();
        assert_eq!(server.config().port, 8000);
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = make_server().router();
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = make_server().router();
        let req = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn analyze_requires_post() {
        let app = make_server().router();
        let req = Request::builder()
            .uri("/analyze")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
