//! Error types for Tolk.

use thiserror::Error;

/// Library-level error type for Tolk operations.
#[derive(Error, Debug)]
pub enum TolkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid file type '{extension}'. Allowed: {allowed}")]
    InvalidFileType { extension: String, allowed: String },

    #[error("File too large ({size} bytes). Maximum size is {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    #[error("No audio file provided")]
    NoFileProvided,

    #[error("Too many files in batch ({count}). Maximum is {max}")]
    BatchTooLarge { count: usize, max: usize },

    #[error("Transcription engine failed: {0}")]
    EngineExecutionFailed(String),

    #[error("Failed to parse engine output: {0}")]
    EngineOutputMalformed(String),

    #[error("Transcription engine unavailable: {0}. Please install it and ensure it's in your PATH.")]
    EngineUnavailable(String),

    #[error("Transcription engine timed out after {0}s")]
    EngineTimeout(u64),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl TolkError {
    /// Whether this error was caused by bad client input rather than a
    /// server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TolkError::InvalidFileType { .. }
                | TolkError::FileTooLarge { .. }
                | TolkError::NoFileProvided
                | TolkError::BatchTooLarge { .. }
                | TolkError::InvalidRequest(_)
        )
    }
}

/// Result type alias for Tolk operations.
pub type Result<T> = std::result::Result<T, TolkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(TolkError::NoFileProvided.is_client_error());
        assert!(TolkError::InvalidFileType {
            extension: "txt".into(),
            allowed: ".wav, .mp3".into()
        }
        .is_client_error());
        assert!(!TolkError::EngineExecutionFailed("boom".into()).is_client_error());
        assert!(!TolkError::EngineTimeout(300).is_client_error());
    }

    #[test]
    fn test_invalid_file_type_names_allowed_extensions() {
        let err = TolkError::InvalidFileType {
            extension: "txt".into(),
            allowed: ".wav, .mp3, .flac, .m4a, .ogg, .aac".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains(".wav"));
        assert!(msg.contains(".aac"));
    }
}
