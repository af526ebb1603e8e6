//! HTTP API server.
//!
//! Exposes the transcription pipeline over four endpoints:
//! `POST /transcribe`, `POST /transcribe/batch`, `GET /health`,
//! `GET /languages`. Every response is a JSON envelope with a boolean
//! `success` discriminator; batch partial failures still return HTTP 200.

use crate::cleanup::CleanupScheduler;
use crate::config::Settings;
use crate::engine::SubprocessEngine;
use crate::error::{Result, TolkError};
use crate::ingest::{StagedUpload, UploadIngestor};
use crate::jobs::{assign_languages, JobOrchestrator, TranscriptionRequest};
use crate::response::{languages_payload, BatchResponse, ErrorResponse, HealthResponse, SingleResponse};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Multipart field name carrying audio payloads.
const AUDIO_FIELD: &str = "audio";

/// Shared application state.
pub struct AppState {
    pub ingestor: UploadIngestor,
    pub orchestrator: JobOrchestrator,
    pub cleanup: CleanupScheduler,
    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self> {
        let ingestor = UploadIngestor::new(settings.upload_dir(), settings.upload.clone())?;
        let engine = Arc::new(SubprocessEngine::new(&settings.engine));
        let orchestrator = JobOrchestrator::new(engine);
        let cleanup = CleanupScheduler::new(Duration::from_millis(settings.cleanup.delay_ms));

        Ok(Self {
            ingestor,
            orchestrator,
            cleanup,
            settings,
        })
    }
}

/// Build the router with all endpoints and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Our own per-part size check produces the typed error, so the framework
    // limit only guards against unbounded bodies.
    let body_limit = state.settings.upload.max_file_bytes as usize
        * state.settings.upload.max_batch_size
        + 1024 * 1024;

    Router::new()
        .route("/health", get(health))
        .route("/languages", get(languages))
        .route("/transcribe", post(transcribe))
        .route("/transcribe/batch", post(transcribe_batch))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

/// Run the server until shutdown.
pub async fn serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(settings)?);
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Map an error to its HTTP status and envelope.
fn error_response(err: &TolkError) -> Response {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ErrorResponse::new(err.to_string()))).into_response()
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse::new(&state.settings.upload))
}

async fn languages() -> impl IntoResponse {
    Json(languages_payload())
}

async fn transcribe(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    match handle_single(&state, multipart).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!(error = %e, "Transcription request failed");
            error_response(&e)
        }
    }
}

async fn transcribe_batch(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    match handle_batch(&state, multipart).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!(error = %e, "Batch request failed");
            error_response(&e)
        }
    }
}

async fn handle_single(state: &AppState, multipart: Multipart) -> Result<SingleResponse> {
    let mut guard = state.cleanup.guard(Vec::new());
    let (mut uploads, languages) = collect_parts(state, multipart, 1, &mut guard).await?;

    let upload = uploads.pop().ok_or(TolkError::NoFileProvided)?;
    let language = languages
        .into_iter()
        .next()
        .unwrap_or_else(|| state.settings.engine.default_language.clone());

    info!(
        filename = %upload.original_filename,
        language = %language,
        "Processing upload"
    );

    let outcome = state
        .orchestrator
        .run_single(TranscriptionRequest { upload, language })
        .await?;

    Ok(outcome.into())
}

async fn handle_batch(state: &AppState, multipart: Multipart) -> Result<BatchResponse> {
    let mut guard = state.cleanup.guard(Vec::new());
    let max = state.ingestor.max_batch_size();
    let (uploads, languages) = collect_parts(state, multipart, max, &mut guard).await?;

    if uploads.is_empty() {
        return Err(TolkError::NoFileProvided);
    }

    let requests = assign_languages(
        uploads,
        &languages,
        &state.settings.engine.default_language,
    );

    let outcome = state.orchestrator.run_batch(requests).await;
    Ok(BatchResponse::new(outcome.summary, outcome.results))
}

/// Walk the multipart body, staging audio parts and collecting language codes.
///
/// Every staged path is registered with the cleanup guard immediately, so
/// files are released even when a later part fails validation.
async fn collect_parts(
    state: &AppState,
    mut multipart: Multipart,
    max_files: usize,
    guard: &mut crate::cleanup::CleanupGuard,
) -> Result<(Vec<StagedUpload>, Vec<String>)> {
    let mut uploads = Vec::new();
    let mut languages = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(TolkError::InvalidRequest(e.to_string())),
        };

        match field.name() {
            Some(AUDIO_FIELD) => {
                if uploads.len() >= max_files {
                    return Err(TolkError::BatchTooLarge {
                        count: uploads.len() + 1,
                        max: max_files,
                    });
                }

                let filename = field
                    .file_name()
                    .map(|n| n.to_string())
                    .ok_or(TolkError::NoFileProvided)?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| TolkError::InvalidRequest(e.to_string()))?;

                let staged = state.ingestor.stage(&filename, &bytes).await?;
                guard.push(staged.path.clone());
                uploads.push(staged);
            }
            Some("language") | Some("languages") => {
                let code = field
                    .text()
                    .await
                    .map_err(|e| TolkError::InvalidRequest(e.to_string()))?;
                if !code.is_empty() {
                    languages.push(code);
                }
            }
            _ => {
                // Unknown fields are ignored.
            }
        }
    }

    Ok((uploads, languages))
}
