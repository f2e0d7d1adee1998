//! The catch-all canary handler.
//!
//! Every request, whatever its method or path, is resolved to a response
//! kind, answered with the secret token, logged, and forwarded to the
//! alert channel.
//!
//! | Path | Body |
//! |------|------|
//! | `/x.json` | `{"token":"..."}` |
//! | `/x.xml` | `<response><token>...</token></response>` |
//! | `/x.html` | `html.html` with the token in both slots |
//! | `/x.csv` | `csv.csv` with the token in its slot |
//! | `/x.txt` | `token=...` |
//! | `/x.gif`, `.png`, `.jpg`, `.jpeg`, `.mp3`, `.mp4` | static placeholder |
//! | anything else | the raw token |

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::format;
use crate::observation;
use crate::state::AppState;
use crate::synthesize::synthesize;

/// Header carrying the secret token on every response.
pub const SECRET_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-secret-token");

/// Answer any request with the token in the requested representation.
///
/// Always responds `200 OK`. Alert delivery runs on a detached task and
/// has no influence on the response.
///
/// The hit is recorded and dispatched before the first await, so a client
/// hanging up mid-response cannot suppress the alert.
pub async fn canary(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let path = observation::request_path(request.uri());
    let resolution = format::resolve(&path);

    let record = observation::capture(&request, resolution.content_type);
    observation::emit(&record);
    drop(state.dispatcher.dispatch(record));

    let body = synthesize(resolution.kind, state.token(), &state.assets).await;

    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static(resolution.content_type)),
            (SECRET_TOKEN_HEADER, state.token_header().clone()),
        ],
        body,
    )
        .into_response()
}
