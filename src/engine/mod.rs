//! Transcription engine abstraction.
//!
//! The engine is an opaque external process: it takes an audio path and an
//! optional language hint and produces text. Keeping it behind a trait means
//! the subprocess backend can later be swapped for an in-process library or a
//! network service without touching the orchestrator.

mod subprocess;

pub use subprocess::SubprocessEngine;

use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

/// Structured payload the engine emits on success.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineOutput {
    /// The transcribed text.
    pub transcription: String,
    /// Language the engine reports having used, if any.
    #[serde(default)]
    pub language: Option<String>,
}

/// Trait for transcription engines.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    /// Transcribe one audio file, optionally with a language hint.
    ///
    /// A single best-effort attempt; no retries. Elapsed time is measured by
    /// the caller so it reflects the full round trip including startup.
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>)
        -> Result<EngineOutput>;
}
