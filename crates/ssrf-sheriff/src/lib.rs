//! SSRF detection canary.
//!
//! This crate provides an Axum HTTP server that answers every request
//! with a secret token, in whatever format the request path's extension
//! asks for, so that a server-side request forgery can be proven by
//! finding the token where it should never be. Every hit is logged and
//! forwarded to Slack.
//!
//! # Pipeline
//!
//! ```text
//! request --> observation::request_path --> format::resolve
//!         --> observation::capture --> observation::emit
//!         --> AlertDispatcher::dispatch (detached)
//!         --> synthesize --> 200 + Content-Type + X-Secret-Token
//! ```
//!
//! The response never depends on logging or alert delivery. Missing
//! assets degrade to an empty body; the `X-Secret-Token` header is
//! always present.

pub mod alerts;
pub mod assets;
pub mod config;
pub mod error;
pub mod format;
pub mod handlers;
pub mod observation;
pub mod router;
pub mod server;
pub mod state;
pub mod synthesize;

// Re-export primary types for convenience.
pub use alerts::{AlertDispatcher, DispatchError, PostedMessage, SlackNotifier};
pub use config::{ConfigError, SheriffConfig};
pub use error::SheriffError;
pub use format::{resolve, Resolution, ResponseKind};
pub use router::build_router;
pub use server::{serve, shutdown_signal, start_server, ServerError};
pub use state::AppState;
