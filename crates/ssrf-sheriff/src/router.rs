//! Axum router construction for the canary.
//!
//! A single handler serves every path and method.

use std::sync::Arc;

use axum::routing::any;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// - `ANY /` -- canary
/// - `ANY /{*path}` -- canary
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", any(handlers::canary))
        .route("/{*path}", any(handlers::canary))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
