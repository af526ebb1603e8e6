//! JSON envelope types returned by every endpoint.
//!
//! Every response carries a boolean `success` discriminator. Batch responses
//! are `success: true` at the top level even when individual items failed;
//! per-item failure lives only inside the results array.

use crate::config::UploadSettings;
use crate::jobs::{BatchItem, BatchSummary, SingleOutcome};
use crate::languages::SUPPORTED_LANGUAGES;
use serde::Serialize;

/// Single-mode success envelope: `{ success: true, data: {...} }`.
#[derive(Debug, Serialize)]
pub struct SingleResponse {
    pub success: bool,
    pub data: TranscriptionData,
}

/// Payload of a single-mode success.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionData {
    pub transcription: String,
    pub language: String,
    pub original_filename: String,
    pub file_size: u64,
    pub processing_time: f64,
}

impl From<SingleOutcome> for SingleResponse {
    fn from(outcome: SingleOutcome) -> Self {
        Self {
            success: true,
            data: TranscriptionData {
                transcription: outcome.transcription,
                language: outcome.language,
                original_filename: outcome.original_filename,
                file_size: outcome.file_size,
                processing_time: outcome.processing_time,
            },
        }
    }
}

/// Batch-mode envelope: `{ success: true, summary: {...}, results: [...] }`.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    pub summary: SummaryPayload,
    pub results: Vec<BatchItemPayload>,
}

#[derive(Debug, Serialize)]
pub struct SummaryPayload {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// One entry in the batch results array, position-matched to the uploads.
#[derive(Debug, Serialize)]
pub struct BatchItemPayload {
    pub filename: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchResponse {
    pub fn new(summary: BatchSummary, results: Vec<BatchItem>) -> Self {
        Self {
            success: true,
            summary: SummaryPayload {
                total: summary.total,
                successful: summary.successful,
                failed: summary.failed,
            },
            results: results
                .into_iter()
                .map(|item| BatchItemPayload {
                    filename: item.filename,
                    success: item.success,
                    transcription: item.transcription,
                    language: item.language,
                    error: item.error,
                })
                .collect(),
        }
    }
}

/// Failure envelope: `{ success: false, error: "<message>" }`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Static service descriptor for `GET /health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub success: bool,
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub supported_formats: Vec<String>,
    pub max_file_size: String,
}

impl HealthResponse {
    pub fn new(upload: &UploadSettings) -> Self {
        Self {
            success: true,
            service: "Tolk Transcription Service",
            version: env!("CARGO_PKG_VERSION"),
            status: "healthy",
            supported_formats: upload
                .allowed_extensions
                .iter()
                .map(|e| format!(".{}", e))
                .collect(),
            max_file_size: upload.max_size_display(),
        }
    }
}

/// Static language catalog for `GET /languages`.
pub fn languages_payload() -> serde_json::Value {
    let mut languages = serde_json::Map::new();
    for (code, name) in SUPPORTED_LANGUAGES {
        languages.insert(code.to_string(), serde_json::Value::String(name.to_string()));
    }
    serde_json::json!({
        "success": true,
        "languages": languages,
    })
}
