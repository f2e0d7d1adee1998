//! SSRF Sheriff binary.
//!
//! Loads configuration, initializes logging, assembles the canary state
//! and serves it until `Ctrl-C` or `SIGTERM`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `config/base.yaml` (or the path given as the
//!    first argument), applying environment overrides
//! 2. Initialize structured logging (tracing)
//! 3. Build the asset store and Slack dispatcher
//! 4. Bind `http.address` and serve
//! 5. Drain connections on shutdown

mod error;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use ssrf_sheriff::{shutdown_signal, start_server, AppState, SheriffConfig};
use tracing::info;

use crate::error::AppError;

/// Configuration file used when no path is given.
const DEFAULT_CONFIG_PATH: &str = "config/base.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, logging setup, binding or serving
/// fails.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load configuration.
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = SheriffConfig::from_file(&config_path)?;

    // 2. Initialize structured logging.
    logging::init(&config.logging)?;

    info!(
        config = %config_path.display(),
        address = config.http.address,
        templates_dir = %config.templates.dir.display(),
        "ssrf-sheriff starting"
    );

    // 3. Assemble shared state.
    let state = Arc::new(AppState::from_config(&config)?);
    info!(
        dispatcher = state.dispatcher.name(),
        channel_id = state.dispatcher.channel_id(),
        timeout_secs = config.slack.timeout_secs,
        "alert dispatcher configured"
    );

    // 4-5. Serve until a termination signal arrives.
    start_server(&config.http, state, shutdown_signal()).await?;

    info!("ssrf-sheriff shutdown complete");
    Ok(())
}
