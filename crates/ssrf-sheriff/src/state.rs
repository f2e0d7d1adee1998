//! Shared application state for the canary server.
//!
//! [`AppState`] is built once at startup and never mutated, so request
//! tasks read it concurrently without locks.

use std::sync::Arc;

use axum::http::HeaderValue;

use crate::alerts::AlertDispatcher;
use crate::assets::AssetStore;
use crate::config::SheriffConfig;
use crate::error::SheriffError;

/// Immutable state injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    token: String,
    token_header: HeaderValue,
    /// Template and media lookup.
    pub assets: AssetStore,
    /// Alert forwarding, shared with detached dispatch tasks.
    pub dispatcher: Arc<AlertDispatcher>,
}

impl AppState {
    /// Assemble state from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`SheriffError::InvalidToken`] if `token` is empty or
    /// cannot be sent as an HTTP header value.
    pub fn new(
        token: impl Into<String>,
        assets: AssetStore,
        dispatcher: AlertDispatcher,
    ) -> Result<Self, SheriffError> {
        let token = token.into();
        let token_header = token_header_value(&token)?;
        Ok(Self {
            token,
            token_header,
            assets,
            dispatcher: Arc::new(dispatcher),
        })
    }

    /// Build state from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SheriffError::InvalidToken`] for an unusable token, or
    /// [`SheriffError::Dispatch`] if the Slack client cannot be built.
    pub fn from_config(config: &SheriffConfig) -> Result<Self, SheriffError> {
        let dispatcher = AlertDispatcher::from_config(&config.slack)?;
        Self::new(
            config.ssrf_token.clone(),
            AssetStore::new(config.templates.dir.clone()),
            dispatcher,
        )
    }

    /// The canary token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The canary token as an `X-Secret-Token` header value.
    pub const fn token_header(&self) -> &HeaderValue {
        &self.token_header
    }
}

/// Validate `token` as a non-empty header value that clients will see
/// byte for byte.
///
/// # Errors
///
/// Returns [`SheriffError::InvalidToken`] when it is not.
pub fn token_header_value(token: &str) -> Result<HeaderValue, SheriffError> {
    if token.is_empty() {
        return Err(SheriffError::InvalidToken("token is empty".to_owned()));
    }
    if token.trim() != token {
        return Err(SheriffError::InvalidToken(
            "token starts or ends with whitespace".to_owned(),
        ));
    }
    HeaderValue::from_str(token).map_err(|e| SheriffError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unusable_tokens() {
        let assets = AssetStore::new("templates");
        assert!(AppState::new("", assets.clone(), AlertDispatcher::Disabled).is_err());
        assert!(AppState::new("bad\ntoken", assets.clone(), AlertDispatcher::Disabled).is_err());
        assert!(AppState::new(" tok ", assets.clone(), AlertDispatcher::Disabled).is_err());
        assert!(AppState::new("tok\t", assets, AlertDispatcher::Disabled).is_err());
    }

    #[test]
    fn keeps_token_and_header_in_sync() {
        let state = AppState::new("abc123", AssetStore::new("templates"), AlertDispatcher::Disabled);
        let Ok(state) = state else {
            panic!("state should build");
        };
        assert_eq!(state.token(), "abc123");
        assert_eq!(state.token_header(), "abc123");
    }

    #[test]
    fn from_config_without_slack_is_disabled() {
        let config = SheriffConfig {
            ssrf_token: "tok".to_owned(),
            ..SheriffConfig::default()
        };
        let Ok(state) = AppState::from_config(&config) else {
            panic!("state should build");
        };
        assert!(matches!(*state.dispatcher, AlertDispatcher::Disabled));
        assert_eq!(state.assets.root(), std::path::Path::new("templates"));
    }
}
