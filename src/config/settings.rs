//! Configuration settings for Tolk.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub upload: UploadSettings,
    pub engine: EngineSettings,
    pub cleanup: CleanupSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

/// Upload staging and validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Directory where uploads are staged before transcription.
    pub upload_dir: String,
    /// Audio file extensions accepted for transcription (without dots).
    pub allowed_extensions: Vec<String>,
    /// Maximum size of a single uploaded file, in bytes.
    pub max_file_bytes: u64,
    /// Maximum number of files accepted in one batch request.
    pub max_batch_size: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            upload_dir: "/tmp/tolk/uploads".to_string(),
            allowed_extensions: ["wav", "mp3", "flac", "m4a", "ogg", "aac"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_file_bytes: 50 * 1024 * 1024,
            max_batch_size: 10,
        }
    }
}

impl UploadSettings {
    /// Allowed extensions formatted for user-facing messages (".wav, .mp3, ...").
    pub fn allowed_display(&self) -> String {
        self.allowed_extensions
            .iter()
            .map(|e| format!(".{}", e))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Maximum file size formatted for the health descriptor ("50MB").
    pub fn max_size_display(&self) -> String {
        format!("{}MB", self.max_file_bytes / (1024 * 1024))
    }
}

/// External transcription engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Command used to launch the engine process.
    pub command: String,
    /// Arguments placed before the audio path (e.g. a script path).
    pub args: Vec<String>,
    /// Language code used when the client does not supply one.
    pub default_language: String,
    /// Wall-clock limit for one engine invocation, in seconds. Zero disables it.
    pub timeout_seconds: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            command: "python3".to_string(),
            args: vec!["python/transcribe.py".to_string()],
            default_language: "en".to_string(),
            timeout_seconds: 300,
        }
    }
}

/// Staged-file cleanup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    /// Delay before removing staged files, in milliseconds. Gives the engine
    /// process time to release its file handle.
    pub delay_ms: u64,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self { delay_ms: 1000 }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tolk")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded upload directory path.
    pub fn upload_dir(&self) -> PathBuf {
        Self::expand_path(&self.upload.upload_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_contract() {
        let settings = Settings::default();
        assert_eq!(settings.upload.max_file_bytes, 50 * 1024 * 1024);
        assert_eq!(settings.upload.max_batch_size, 10);
        assert_eq!(settings.engine.default_language, "en");
        assert_eq!(settings.upload.allowed_extensions.len(), 6);
        assert!(settings.upload.allowed_extensions.contains(&"wav".to_string()));
    }

    #[test]
    fn test_allowed_display_is_dot_prefixed() {
        let upload = UploadSettings::default();
        let display = upload.allowed_display();
        assert!(display.starts_with(".wav"));
        assert!(display.contains(".aac"));
    }

    #[test]
    fn test_max_size_display() {
        let upload = UploadSettings::default();
        assert_eq!(upload.max_size_display(), "50MB");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [server]
            port = 8080
            "#,
        )
        .unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.engine.command, "python3");
    }
}
