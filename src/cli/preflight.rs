//! Pre-flight checks before starting the server.
//!
//! Validates that the engine command and upload directory are usable before
//! accepting requests that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, TolkError};
use std::process::Command;

/// Verify the configured engine command can be launched.
///
/// The engine itself is a black box, so this only checks the interpreter or
/// binary resolves; a `--version` probe would be meaningless for an arbitrary
/// script argument.
pub fn check_engine(settings: &Settings) -> Result<()> {
    match Command::new(&settings.engine.command).arg("--version").output() {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TolkError::EngineUnavailable(settings.engine.command.clone()))
        }
        Err(e) => Err(TolkError::EngineUnavailable(format!(
            "{}: {}",
            settings.engine.command, e
        ))),
    }
}

/// Verify the upload directory can be created and written to.
pub fn check_upload_dir(settings: &Settings) -> Result<()> {
    let dir = settings.upload_dir();
    std::fs::create_dir_all(&dir)?;

    let probe = dir.join(".tolk-write-probe");
    std::fs::write(&probe, b"probe")?;
    std::fs::remove_file(&probe)?;
    Ok(())
}
