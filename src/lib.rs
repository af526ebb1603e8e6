//! Tolk - Audio Transcription Service
//!
//! An HTTP service that accepts audio uploads and transcribes them through an
//! external speech-to-text engine invoked as a subprocess.
//!
//! The name "Tolk" comes from the Norwegian word for "interpreter."
//!
//! # Overview
//!
//! Tolk allows you to:
//! - Upload one audio file and get its transcription back
//! - Submit a batch of files where one bad file never aborts the rest
//! - Swap the transcription engine by configuration, without code changes
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `ingest` - Upload validation and staging
//! - `engine` - Transcription engine abstraction and subprocess backend
//! - `jobs` - Single and batch job orchestration
//! - `cleanup` - Deferred removal of staged files
//! - `response` - JSON envelope types
//! - `server` - HTTP API surface
//!
//! # Example
//!
//! ```rust,no_run
//! use tolk::config::Settings;
//! use tolk::server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     server::serve("127.0.0.1", 3001, settings).await
//! }
//! ```

pub mod cleanup;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod jobs;
pub mod languages;
pub mod response;
pub mod server;

pub use error::{Result, TolkError};
