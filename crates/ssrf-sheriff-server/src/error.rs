//! Error types for the SSRF Sheriff binary.
//!
//! [`AppError`] is the top-level error type that wraps every failure
//! mode during startup and serving.

use ssrf_sheriff::{ConfigError, ServerError, SheriffError};

/// Top-level error for the SSRF Sheriff binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Application state could not be assembled.
    #[error("startup error: {source}")]
    Startup {
        /// The underlying library error.
        #[from]
        source: SheriffError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: ServerError,
    },

    /// The global tracing subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },
}
