//! Serve command: runs the transcription HTTP server.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::server;

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    if let Err(e) = preflight::check_engine(&settings) {
        Output::warning(&format!("Engine check failed: {}", e));
        Output::warning("Transcription requests will fail until the engine is available.");
    }

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    Output::header("Tolk Transcription Server");
    println!();
    Output::success(&format!("Listening on http://{}:{}", host, port));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Languages", "GET  /languages");
    Output::kv("Transcribe", "POST /transcribe");
    Output::kv("Batch", "POST /transcribe/batch");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    server::serve(&host, port, settings).await
}
