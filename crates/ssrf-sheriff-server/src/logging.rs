//! Console logging setup.

use ssrf_sheriff::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`.
///
/// # Errors
///
/// Returns [`AppError::Logging`] if a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| AppError::Logging {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_an_error_not_a_panic() {
        let config = LoggingConfig::default();
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
