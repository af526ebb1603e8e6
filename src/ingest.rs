//! Upload validation and staging.
//!
//! Incoming audio payloads are validated against the configured extension
//! allow-list and size ceiling, then written to a unique path in the upload
//! directory before the engine ever sees them.

use crate::config::UploadSettings;
use crate::error::{Result, TolkError};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// An accepted upload, staged to durable temporary storage.
///
/// Exclusively owned by the request that created it; removed by the cleanup
/// scheduler once the owning request reaches a terminal state.
#[derive(Debug, Clone)]
pub struct StagedUpload {
    /// Path the payload was written to.
    pub path: PathBuf,
    /// Filename as supplied by the client.
    pub original_filename: String,
    /// Lowercased extension, without the dot.
    pub extension: String,
    /// Payload size in bytes.
    pub size: u64,
    /// When the upload was accepted.
    pub received_at: DateTime<Utc>,
}

/// Validates and stages incoming audio payloads.
pub struct UploadIngestor {
    upload_dir: PathBuf,
    settings: UploadSettings,
}

impl UploadIngestor {
    /// Create an ingestor, ensuring the upload directory exists.
    pub fn new(upload_dir: PathBuf, settings: UploadSettings) -> Result<Self> {
        std::fs::create_dir_all(&upload_dir)?;
        Ok(Self {
            upload_dir,
            settings,
        })
    }

    /// Maximum number of files accepted in one batch request.
    pub fn max_batch_size(&self) -> usize {
        self.settings.max_batch_size
    }

    /// Validate a filename's extension against the allow-list.
    ///
    /// Match is on the extension only, case-insensitive; content is never
    /// sniffed.
    pub fn validate_extension(&self, filename: &str) -> Result<String> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if self
            .settings
            .allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
        {
            Ok(extension)
        } else {
            Err(TolkError::InvalidFileType {
                extension,
                allowed: self.settings.allowed_display(),
            })
        }
    }

    /// Validate and write one payload to a unique path in the upload directory.
    ///
    /// Rejected payloads leave no file behind.
    #[instrument(skip(self, bytes), fields(filename = %original_filename))]
    pub async fn stage(&self, original_filename: &str, bytes: &[u8]) -> Result<StagedUpload> {
        let extension = self.validate_extension(original_filename)?;

        let size = bytes.len() as u64;
        if size > self.settings.max_file_bytes {
            return Err(TolkError::FileTooLarge {
                size,
                max: self.settings.max_file_bytes,
            });
        }

        let path = self.unique_path(&extension);
        tokio::fs::write(&path, bytes).await?;

        debug!(path = %path.display(), size, "Staged upload");

        Ok(StagedUpload {
            path,
            original_filename: original_filename.to_string(),
            extension,
            size,
            received_at: Utc::now(),
        })
    }

    /// Build a collision-free staging path.
    ///
    /// Current time plus a random component, so concurrent uploads never
    /// collide even within the clock's granularity.
    fn unique_path(&self, extension: &str) -> PathBuf {
        let suffix = uuid::Uuid::new_v4().simple();
        self.upload_dir.join(format!(
            "audio-{}-{}.{}",
            Utc::now().timestamp_millis(),
            suffix,
            extension
        ))
    }
}
