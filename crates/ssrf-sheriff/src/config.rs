//! Configuration loading and typed config structures for SSRF Sheriff.
//!
//! The canonical configuration lives in `config/base.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure and a
//! loader that reads, overrides and validates the file.
//!
//! ```yaml
//! http:
//!   address: "0.0.0.0:8000"
//! ssrf_token: "74535c6fdc2ae2d33bb16b1ddf0f8b0c"
//! slack:
//!   token: "xoxb-..."
//!   channel_id: "C0123456789"
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but cannot be used.
    #[error("invalid configuration: {message}")]
    Invalid {
        /// What is wrong with it.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SheriffConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// The canary token leaked in every response.
    #[serde(default)]
    pub ssrf_token: String,

    /// Slack alerting settings.
    #[serde(default)]
    pub slack: SlackConfig,

    /// Template and media asset settings.
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SheriffConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `SSRF_TOKEN` overrides `ssrf_token`
    /// - `SLACK_TOKEN` overrides `slack.token`
    /// - `SLACK_CHANNEL_ID` overrides `slack.channel_id`
    /// - `HTTP_ADDRESS` overrides `http.address`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Override secrets and the listen address with environment variables
    /// when set, so deployments need not write them into the YAML file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SSRF_TOKEN") {
            self.ssrf_token = val;
        }
        if let Ok(val) = std::env::var("SLACK_TOKEN") {
            self.slack.token = val;
        }
        if let Ok(val) = std::env::var("SLACK_CHANNEL_ID") {
            self.slack.channel_id = val;
        }
        if let Ok(val) = std::env::var("HTTP_ADDRESS") {
            self.http.address = val;
        }
    }

    /// Check the invariants the server relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the token is empty or padded
    /// with whitespace, the listen address does not parse, or the Slack
    /// timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssrf_token.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "ssrf_token must not be empty".to_owned(),
            });
        }
        // Clients trim header values, so padding would never match.
        if self.ssrf_token.trim() != self.ssrf_token {
            return Err(ConfigError::Invalid {
                message: "ssrf_token must not start or end with whitespace".to_owned(),
            });
        }
        if self.slack.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "slack.timeout_secs must be at least 1".to_owned(),
            });
        }
        self.http.socket_addr()?;
        Ok(())
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// `host:port` to bind.
    #[serde(default = "default_http_address")]
    pub address: String,
}

impl HttpConfig {
    /// Parse [`address`](Self::address).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if it is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.address.parse().map_err(|e| ConfigError::Invalid {
            message: format!("invalid http.address {:?}: {e}", self.address),
        })
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: default_http_address(),
        }
    }
}

/// Slack Web API configuration.
///
/// Alerting is disabled when either `token` or `channel_id` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlackConfig {
    /// Bot token (`xoxb-...`).
    #[serde(default)]
    pub token: String,

    /// Destination channel ID.
    #[serde(default)]
    pub channel_id: String,

    /// Base URL of the Slack Web API.
    #[serde(default = "default_slack_api_url")]
    pub api_url: String,

    /// Upper bound on a single `chat.postMessage` call, in seconds.
    #[serde(default = "default_slack_timeout_secs")]
    pub timeout_secs: u64,
}

impl SlackConfig {
    /// Whether enough is configured to post messages.
    pub fn is_enabled(&self) -> bool {
        !self.token.is_empty() && !self.channel_id.is_empty()
    }

    /// [`timeout_secs`](Self::timeout_secs) as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            channel_id: String::new(),
            api_url: default_slack_api_url(),
            timeout_secs: default_slack_timeout_secs(),
        }
    }
}

/// Asset directory configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplatesConfig {
    /// Flat directory holding `html.html`, `csv.csv` and the media files.
    #[serde(default = "default_templates_dir")]
    pub dir: PathBuf,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: default_templates_dir(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Console log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

fn default_http_address() -> String {
    "0.0.0.0:8000".to_owned()
}

fn default_slack_api_url() -> String {
    "https://slack.com/api".to_owned()
}

const fn default_slack_timeout_secs() -> u64 {
    5
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SheriffConfig::default();
        assert_eq!(config.http.address, "0.0.0.0:8000");
        assert_eq!(config.slack.api_url, "https://slack.com/api");
        assert_eq!(config.slack.timeout(), Duration::from_secs(5));
        assert_eq!(config.templates.dir, PathBuf::from("templates"));
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(!config.slack.is_enabled());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
http:
  address: "127.0.0.1:9000"
ssrf_token: "abc123"
slack:
  token: "xoxb-test"
  channel_id: "C0TEST"
  api_url: "http://localhost:9999/api"
  timeout_secs: 2
templates:
  dir: "/srv/sheriff/templates"
logging:
  level: "debug"
  format: "json"
"#;
        let config = SheriffConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.unwrap_or_default();
        assert_eq!(config.ssrf_token, "abc123");
        assert_eq!(config.http.address, "127.0.0.1:9000");
        assert_eq!(config.slack.channel_id, "C0TEST");
        assert_eq!(config.slack.timeout_secs, 2);
        assert!(config.slack.is_enabled());
        assert_eq!(config.templates.dir, PathBuf::from("/srv/sheriff/templates"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let config = SheriffConfig::parse("ssrf_token: tok\n").unwrap_or_default();
        assert_eq!(config.ssrf_token, "tok");
        assert_eq!(config.http, HttpConfig::default());
        assert_eq!(config.slack, SlackConfig::default());
    }

    #[test]
    fn empty_token_is_rejected() {
        let result = SheriffConfig::parse("ssrf_token: \"  \"\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn bad_address_is_rejected() {
        let result = SheriffConfig::parse("ssrf_token: tok\nhttp:\n  address: nowhere\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn zero_slack_timeout_is_rejected() {
        let result = SheriffConfig::parse("ssrf_token: tok\nslack:\n  timeout_secs: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));

        let result = SheriffConfig::parse("ssrf_token: tok\nslack:\n  timeout_secs: 1\n");
        assert!(result.is_ok());
    }

    #[test]
    fn padded_token_is_rejected() {
        for yaml in ["ssrf_token: \" tok \"\n", "ssrf_token: \"tok\\t\"\n"] {
            let result = SheriffConfig::parse(yaml);
            assert!(matches!(result, Err(ConfigError::Invalid { .. })), "{yaml:?}");
        }
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let result = SheriffConfig::parse("ssrf_token: [unterminated\n");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = SheriffConfig::from_file(Path::new("/nonexistent/ssrf-sheriff.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("base.yaml");
        if path.exists() {
            let contents = std::fs::read_to_string(&path).unwrap_or_default();
            let config = SheriffConfig::parse(&contents);
            assert!(config.is_ok(), "config/base.yaml failed to load: {config:?}");
        }
    }
}
