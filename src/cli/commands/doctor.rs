//! Doctor command: checks system requirements.

use crate::cli::{preflight, Output};
use crate::config::Settings;

/// Check that the engine and upload directory are usable.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Tolk Doctor");
    println!();

    let mut healthy = true;

    match preflight::check_engine(settings) {
        Ok(()) => Output::success(&format!("Engine command: {}", settings.engine.command)),
        Err(e) => {
            healthy = false;
            Output::error(&format!("Engine command: {}", e));
        }
    }

    match preflight::check_upload_dir(settings) {
        Ok(()) => Output::success(&format!(
            "Upload directory: {}",
            settings.upload_dir().display()
        )),
        Err(e) => {
            healthy = false;
            Output::error(&format!("Upload directory: {}", e));
        }
    }

    println!();
    if healthy {
        Output::success("All checks passed.");
    } else {
        Output::warning("Some checks failed; fix the issues above before serving.");
    }

    Ok(())
}
