//! Top-level error type for the SSRF Sheriff library.
//!
//! Only startup can fail. Once serving, every request is answered with
//! status 200 and internal failures are logged instead of surfaced.

use crate::alerts::DispatchError;

/// Errors that can occur while assembling the canary state.
#[derive(Debug, thiserror::Error)]
pub enum SheriffError {
    /// The secret token cannot be served as a header.
    #[error("invalid ssrf_token: {0}")]
    InvalidToken(String),

    /// The alert dispatcher could not be constructed.
    #[error("alert dispatcher error: {0}")]
    Dispatch(#[from] DispatchError),
}
