//! Transcription job orchestration.
//!
//! Sequences one or many engine invocations. Batch items run sequentially and
//! are isolated from each other: one failed file never aborts the rest, and
//! the results list always position-matches the input.

use crate::engine::TranscriptionEngine;
use crate::error::Result;
use crate::ingest::StagedUpload;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// One staged upload paired with its resolved language code.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub upload: StagedUpload,
    pub language: String,
}

/// Outcome of a single-mode transcription.
#[derive(Debug, Clone)]
pub struct SingleOutcome {
    pub transcription: String,
    pub language: String,
    pub original_filename: String,
    pub file_size: u64,
    pub processing_time: f64,
}

/// Outcome of one batch item, success or failure.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub filename: String,
    pub success: bool,
    pub transcription: Option<String>,
    pub language: Option<String>,
    pub error: Option<String>,
}

impl BatchItem {
    fn success(filename: String, language: String, transcription: String) -> Self {
        Self {
            filename,
            success: true,
            transcription: Some(transcription),
            language: Some(language),
            error: None,
        }
    }

    fn failure(filename: String, error: String) -> Self {
        Self {
            filename,
            success: false,
            transcription: None,
            language: None,
            error: Some(error),
        }
    }
}

/// Aggregate counts for a completed batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// A completed batch: summary plus per-item results in input order.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub summary: BatchSummary,
    pub results: Vec<BatchItem>,
}

/// Dispatches transcription requests to the engine.
pub struct JobOrchestrator {
    engine: Arc<dyn TranscriptionEngine>,
}

impl JobOrchestrator {
    pub fn new(engine: Arc<dyn TranscriptionEngine>) -> Self {
        Self { engine }
    }

    /// Run exactly one request. Any engine failure is the whole request's
    /// failure.
    ///
    /// Elapsed time is measured here, around the adapter call, so it covers
    /// the full round trip including process startup.
    #[instrument(skip(self, request), fields(filename = %request.upload.original_filename))]
    pub async fn run_single(&self, request: TranscriptionRequest) -> Result<SingleOutcome> {
        info!(language = %request.language, "Dispatching transcription");

        let started = Instant::now();
        let output = self
            .engine
            .transcribe(&request.upload.path, Some(&request.language))
            .await?;
        let processing_time = started.elapsed().as_secs_f64();

        Ok(SingleOutcome {
            transcription: output.transcription,
            language: request.language,
            original_filename: request.upload.original_filename,
            file_size: request.upload.size,
            processing_time,
        })
    }

    /// Run a batch of requests sequentially, isolating per-item failures.
    ///
    /// The returned results fold the input order; a failed item is recorded
    /// and the batch continues.
    #[instrument(skip(self, requests), fields(total = requests.len()))]
    pub async fn run_batch(&self, requests: Vec<TranscriptionRequest>) -> BatchOutcome {
        let total = requests.len();

        let results: Vec<BatchItem> = stream::iter(requests)
            .then(|request| async move {
                let filename = request.upload.original_filename.clone();
                match self
                    .engine
                    .transcribe(&request.upload.path, Some(&request.language))
                    .await
                {
                    Ok(output) => {
                        BatchItem::success(filename, request.language, output.transcription)
                    }
                    Err(e) => {
                        warn!(filename = %filename, error = %e, "Batch item failed");
                        BatchItem::failure(filename, e.to_string())
                    }
                }
            })
            .collect()
            .await;

        let successful = results.iter().filter(|r| r.success).count();
        let summary = BatchSummary {
            total,
            successful,
            failed: total - successful,
        };

        info!(
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            "Batch complete"
        );

        BatchOutcome { summary, results }
    }
}

/// Pair uploads with language codes by position.
///
/// Items past the supplied codes fall back to the default; surplus codes are
/// ignored.
pub fn assign_languages(
    uploads: Vec<StagedUpload>,
    languages: &[String],
    default_language: &str,
) -> Vec<TranscriptionRequest> {
    uploads
        .into_iter()
        .enumerate()
        .map(|(i, upload)| TranscriptionRequest {
            upload,
            language: languages
                .get(i)
                .cloned()
                .unwrap_or_else(|| default_language.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineOutput;
    use crate::error::TolkError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::path::{Path, PathBuf};

    /// Engine double that fails for any path containing "bad".
    struct ScriptedEngine;

    #[async_trait]
    impl TranscriptionEngine for ScriptedEngine {
        async fn transcribe(
            &self,
            audio_path: &Path,
            language: Option<&str>,
        ) -> Result<EngineOutput> {
            if audio_path.to_string_lossy().contains("bad") {
                return Err(TolkError::EngineExecutionFailed("decode error".into()));
            }
            Ok(EngineOutput {
                transcription: format!("text for {}", audio_path.display()),
                language: language.map(|l| l.to_string()),
            })
        }
    }

    fn upload(name: &str) -> StagedUpload {
        StagedUpload {
            path: PathBuf::from(format!("/tmp/{}", name)),
            original_filename: name.to_string(),
            extension: "wav".to_string(),
            size: 4,
            received_at: Utc::now(),
        }
    }

    fn request(name: &str, language: &str) -> TranscriptionRequest {
        TranscriptionRequest {
            upload: upload(name),
            language: language.to_string(),
        }
    }

    #[tokio::test]
    async fn test_single_success_carries_metadata() {
        let orchestrator = JobOrchestrator::new(Arc::new(ScriptedEngine));
        let outcome = orchestrator.run_single(request("a.wav", "hi")).await.unwrap();

        assert!(outcome.transcription.contains("a.wav"));
        assert_eq!(outcome.language, "hi");
        assert_eq!(outcome.original_filename, "a.wav");
        assert_eq!(outcome.file_size, 4);
        assert!(outcome.processing_time >= 0.0);
    }

    #[tokio::test]
    async fn test_single_failure_propagates() {
        let orchestrator = JobOrchestrator::new(Arc::new(ScriptedEngine));
        let err = orchestrator
            .run_single(request("bad.wav", "en"))
            .await
            .unwrap_err();
        assert!(matches!(err, TolkError::EngineExecutionFailed(_)));
    }

    #[tokio::test]
    async fn test_batch_isolates_failures_and_keeps_order() {
        let orchestrator = JobOrchestrator::new(Arc::new(ScriptedEngine));
        let outcome = orchestrator
            .run_batch(vec![
                request("one.wav", "en"),
                request("bad-two.wav", "en"),
                request("three.wav", "en"),
            ])
            .await;

        assert_eq!(outcome.summary.total, 3);
        assert_eq!(outcome.summary.successful, 2);
        assert_eq!(outcome.summary.failed, 1);

        assert_eq!(outcome.results[0].filename, "one.wav");
        assert!(outcome.results[0].success);
        assert_eq!(outcome.results[1].filename, "bad-two.wav");
        assert!(!outcome.results[1].success);
        assert_eq!(outcome.results[1].error.as_deref(), Some("Transcription engine failed: decode error"));
        assert_eq!(outcome.results[2].filename, "three.wav");
        assert!(outcome.results[2].success);
    }

    #[tokio::test]
    async fn test_batch_of_all_failures_still_completes() {
        let orchestrator = JobOrchestrator::new(Arc::new(ScriptedEngine));
        let outcome = orchestrator
            .run_batch(vec![request("bad-a.wav", "en"), request("bad-b.wav", "en")])
            .await;

        assert_eq!(outcome.summary.successful, 0);
        assert_eq!(outcome.summary.failed, 2);
        assert_eq!(outcome.results.len(), 2);
    }

    #[test]
    fn test_assign_languages_pads_with_default() {
        let uploads = vec![upload("a.wav"), upload("b.wav"), upload("c.wav")];
        let requests = assign_languages(uploads, &["hi".to_string()], "en");

        assert_eq!(requests[0].language, "hi");
        assert_eq!(requests[1].language, "en");
        assert_eq!(requests[2].language, "en");
    }

    #[test]
    fn test_assign_languages_ignores_surplus_codes() {
        let uploads = vec![upload("a.wav")];
        let requests = assign_languages(
            uploads,
            &["fr".to_string(), "de".to_string(), "ja".to_string()],
            "en",
        );

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].language, "fr");
    }
}
