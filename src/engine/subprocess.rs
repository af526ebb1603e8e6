//! Subprocess-backed transcription engine.
//!
//! Invokes the engine as `command [args..] <audio-path> [language]` and parses
//! a single JSON object from its standard output.

use super::{EngineOutput, TranscriptionEngine};
use crate::config::EngineSettings;
use crate::error::{Result, TolkError};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Transcription engine invoked as an external process per call.
pub struct SubprocessEngine {
    command: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl SubprocessEngine {
    /// Create an engine from its settings.
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            command: settings.command.clone(),
            args: settings.args.clone(),
            timeout: (settings.timeout_seconds > 0)
                .then(|| Duration::from_secs(settings.timeout_seconds)),
        }
    }

    /// Create an engine from a bare command line, mainly for tests.
    pub fn with_command(command: &str, args: &[&str], timeout: Option<Duration>) -> Self {
        Self {
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            timeout,
        }
    }

    async fn run(&self, audio_path: &Path, language: Option<&str>) -> Result<std::process::Output> {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .arg(audio_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A dropped future must not leave an orphaned engine process.
            .kill_on_drop(true);

        if let Some(lang) = language {
            cmd.arg(lang);
        }

        let output_fut = cmd.output();

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, output_fut).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(command = %self.command, "Engine process timed out");
                    return Err(TolkError::EngineTimeout(limit.as_secs()));
                }
            },
            None => output_fut.await,
        };

        match result {
            Ok(output) => Ok(output),
            Err(e)
                if e.kind() == std::io::ErrorKind::NotFound
                    || e.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                Err(TolkError::EngineUnavailable(self.command.clone()))
            }
            Err(e) => Err(TolkError::EngineUnavailable(format!(
                "{}: {}",
                self.command, e
            ))),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for SubprocessEngine {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<EngineOutput> {
        debug!(command = %self.command, "Spawning engine process");

        let output = self.run(audio_path, language).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(TolkError::EngineExecutionFailed(stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed: EngineOutput = serde_json::from_str(stdout.trim())
            .map_err(|_| TolkError::EngineOutputMalformed(stdout.trim().to_string()))?;

        debug!(chars = parsed.transcription.len(), "Engine output parsed");
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    /// Write an executable shell script standing in for the engine.
    fn fake_engine(dir: &Path, body: &str) -> PathBuf {
        let script = dir.join("engine.sh");
        std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();
        script
    }

    #[tokio::test]
    async fn test_successful_transcription() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_engine(
            dir.path(),
            r#"echo '{"transcription": "hello world", "language": "en"}'"#,
        );
        let engine = SubprocessEngine::with_command(script.to_str().unwrap(), &[], None);

        let output = engine
            .transcribe(Path::new("/tmp/fake.wav"), Some("en"))
            .await
            .unwrap();
        assert_eq!(output.transcription, "hello world");
        assert_eq!(output.language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_language_hint_is_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        // Echoes the language argument back as the transcription.
        let script = fake_engine(
            dir.path(),
            r#"printf '{"transcription": "%s"}' "$2""#,
        );
        let engine = SubprocessEngine::with_command(script.to_str().unwrap(), &[], None);

        let output = engine
            .transcribe(Path::new("/tmp/fake.wav"), Some("hi"))
            .await
            .unwrap();
        assert_eq!(output.transcription, "hi");
    }

    #[tokio::test]
    async fn test_nonzero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_engine(dir.path(), "echo 'decode error' >&2\nexit 1");
        let engine = SubprocessEngine::with_command(script.to_str().unwrap(), &[], None);

        let err = engine
            .transcribe(Path::new("/tmp/fake.wav"), None)
            .await
            .unwrap_err();
        match err {
            TolkError::EngineExecutionFailed(stderr) => assert_eq!(stderr, "decode error"),
            other => panic!("expected EngineExecutionFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_output_keeps_raw_text() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_engine(dir.path(), "echo 'not json at all'");
        let engine = SubprocessEngine::with_command(script.to_str().unwrap(), &[], None);

        let err = engine
            .transcribe(Path::new("/tmp/fake.wav"), None)
            .await
            .unwrap_err();
        match err {
            TolkError::EngineOutputMalformed(raw) => assert_eq!(raw, "not json at all"),
            other => panic!("expected EngineOutputMalformed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let engine =
            SubprocessEngine::with_command("/nonexistent/transcribe-engine", &[], None);

        let err = engine
            .transcribe(Path::new("/tmp/fake.wav"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TolkError::EngineUnavailable(_)));
    }

    #[tokio::test]
    async fn test_slow_engine_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_engine(dir.path(), "sleep 5");
        let engine = SubprocessEngine::with_command(
            script.to_str().unwrap(),
            &[],
            Some(Duration::from_millis(100)),
        );

        let err = engine
            .transcribe(Path::new("/tmp/fake.wav"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TolkError::EngineTimeout(_)));
    }
}
