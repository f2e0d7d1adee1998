//! Slack alerting for canary hits.
//!
//! Every [`ObservationRecord`] is posted as JSON text to the configured
//! Slack channel via the Web API `chat.postMessage` method.
//!
//! Delivery is best-effort and at-most-once. [`AlertDispatcher::dispatch`]
//! runs the call on a detached task bounded by the configured timeout, so
//! a slow or failing Slack never delays the canary response and a client
//! hanging up never cancels the alert. Failures are logged, never retried.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::SlackConfig;
use crate::observation::ObservationRecord;

/// Errors that can occur while forwarding an observation to Slack.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Slack alerting is not configured.
    #[error("slack alerting is disabled")]
    Disabled,

    /// The observation could not be rendered as message text.
    #[error("failed to serialize observation: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The HTTP call failed (connect, TLS, body decode).
    #[error("slack request failed: {0}")]
    Request(String),

    /// Slack answered with a non-success HTTP status (e.g. 429).
    #[error("slack returned HTTP {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// Slack answered `ok: false` (e.g. `invalid_auth`, `channel_not_found`).
    #[error("slack rejected the message: {error}")]
    Rejected {
        /// Slack's error code.
        error: String,
        /// Channel ID echoed back by Slack, if any.
        channel: Option<String>,
    },

    /// The call did not finish within the configured timeout.
    #[error("slack call timed out after {0:?}")]
    Timeout(Duration),
}

/// Identifier of a message Slack accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    /// Channel the message landed in.
    pub channel: String,
    /// Slack message timestamp, which doubles as its ID.
    pub ts: String,
}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

/// Subset of the `chat.postMessage` response we care about.
#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl PostMessageResponse {
    fn into_result(self) -> Result<PostedMessage, DispatchError> {
        if self.ok {
            Ok(PostedMessage {
                channel: self.channel.unwrap_or_default(),
                ts: self.ts.unwrap_or_default(),
            })
        } else {
            Err(DispatchError::Rejected {
                error: self.error.unwrap_or_else(|| "unknown_error".to_owned()),
                channel: self.channel,
            })
        }
    }
}

/// Client for the Slack Web API `chat.postMessage` method.
#[derive(Clone)]
pub struct SlackNotifier {
    client: reqwest::Client,
    api_url: String,
    token: String,
    channel_id: String,
}

impl fmt::Debug for SlackNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackNotifier")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .finish_non_exhaustive()
    }
}

impl SlackNotifier {
    /// Create a notifier posting to `config.channel_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Request`] if the HTTP client cannot be
    /// built.
    pub fn new(config: &SlackConfig) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DispatchError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            token: config.token.clone(),
            channel_id: config.channel_id.clone(),
        })
    }

    /// The destination channel ID.
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Post `text` to the configured channel.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Request`] on transport failure,
    /// [`DispatchError::Status`] on a non-2xx answer, and
    /// [`DispatchError::Rejected`] when Slack answers `ok: false`.
    pub async fn post_message(&self, text: &str) -> Result<PostedMessage, DispatchError> {
        let url = format!("{}/chat.postMessage", self.api_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&PostMessageRequest {
                channel: &self.channel_id,
                text,
            })
            .send()
            .await
            .map_err(|e| DispatchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status {
                status: status.as_u16(),
            });
        }

        let body: PostMessageResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::Request(format!("invalid slack response: {e}")))?;

        body.into_result()
    }
}

/// Forwards observation records to the alerting channel.
///
/// Uses enum dispatch instead of trait objects because async methods
/// are not dyn-compatible in Rust.
#[derive(Debug, Clone)]
pub enum AlertDispatcher {
    /// Post to Slack, bounding each call by `timeout`.
    Slack {
        /// The Slack client.
        notifier: SlackNotifier,
        /// Upper bound on one delivery.
        timeout: Duration,
    },
    /// No credentials configured; observations are only logged.
    Disabled,
}

impl AlertDispatcher {
    /// Build a dispatcher from configuration.
    ///
    /// Returns [`AlertDispatcher::Disabled`] when the token or channel is
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Request`] if the HTTP client cannot be
    /// built.
    pub fn from_config(config: &SlackConfig) -> Result<Self, DispatchError> {
        if !config.is_enabled() {
            return Ok(Self::Disabled);
        }
        Ok(Self::Slack {
            notifier: SlackNotifier::new(config)?,
            timeout: config.timeout(),
        })
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Slack { .. } => "slack",
            Self::Disabled => "disabled",
        }
    }

    /// Destination channel ID, empty when disabled.
    pub fn channel_id(&self) -> &str {
        match self {
            Self::Slack { notifier, .. } => notifier.channel_id(),
            Self::Disabled => "",
        }
    }

    /// Post `record` and wait for Slack's answer, bounded by the timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Disabled`] when alerting is off, or any
    /// delivery failure including [`DispatchError::Timeout`].
    pub async fn notify(&self, record: &ObservationRecord) -> Result<PostedMessage, DispatchError> {
        match self {
            Self::Slack { notifier, timeout } => {
                let text = record.to_json()?;
                tokio::time::timeout(*timeout, notifier.post_message(&text))
                    .await
                    .unwrap_or(Err(DispatchError::Timeout(*timeout)))
            }
            Self::Disabled => Err(DispatchError::Disabled),
        }
    }

    /// Forward `record` on a detached task and log the outcome.
    ///
    /// The returned handle may be dropped; the task runs to completion
    /// regardless.
    pub fn dispatch(self: &Arc<Self>, record: ObservationRecord) -> JoinHandle<()> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            match dispatcher.notify(&record).await {
                Ok(message) => info!(
                    channel_id = %message.channel,
                    message_ts = %message.ts,
                    path = %record.path,
                    "observation forwarded to slack"
                ),
                Err(DispatchError::Disabled) => {
                    debug!(path = %record.path, "slack alerting disabled, observation not forwarded");
                }
                Err(DispatchError::Rejected { error, channel }) => error!(
                    error = %error,
                    channel_id = %channel.as_deref().unwrap_or(dispatcher.channel_id()),
                    path = %record.path,
                    "slack send message"
                ),
                Err(e) => error!(
                    error = %e,
                    channel_id = %dispatcher.channel_id(),
                    path = %record.path,
                    "slack send message"
                ),
            }
        })
    }
}
