//! Per-request observation records.
//!
//! [`capture`] snapshots who hit the canary and how; [`emit`] writes that
//! snapshot to the log. The same record is later forwarded to Slack by
//! the [`alerts`](crate::alerts) module.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, Uri};
use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Remote address recorded when the connection info is unavailable.
pub const UNKNOWN_REMOTE_ADDR: &str = "unknown";

/// Immutable snapshot of one inbound canary request.
///
/// Field names are serialized in the operator-facing form used by both
/// the log line and the Slack message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationRecord {
    /// Peer `ip:port`.
    #[serde(rename = "IP")]
    pub remote_addr: String,
    /// HTTP method.
    #[serde(rename = "Method")]
    pub method: String,
    /// Request path, percent-decoded.
    #[serde(rename = "Path")]
    pub path: String,
    /// Content type the canary answered with.
    #[serde(rename = "Response Content-Type")]
    pub content_type: String,
    /// Header name to every value sent for it, in arrival order.
    #[serde(rename = "Headers")]
    pub headers: BTreeMap<String, Vec<String>>,
    /// When the request was observed.
    #[serde(rename = "Observed At")]
    pub observed_at: DateTime<Utc>,
}

impl ObservationRecord {
    /// Compact JSON rendering used as the alert message text.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Snapshot the observable parts of `request`.
pub fn capture<B>(request: &Request<B>, content_type: &str) -> ObservationRecord {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| UNKNOWN_REMOTE_ADDR.to_owned(), |info| info.0.to_string());

    ObservationRecord {
        remote_addr,
        method: request.method().to_string(),
        path: request_path(request.uri()),
        content_type: content_type.to_owned(),
        headers: header_values(request.headers()),
        observed_at: Utc::now(),
    }
}

/// The percent-decoded path of `uri`.
///
/// Escapes that do not form valid UTF-8 are replaced with U+FFFD.
pub fn request_path(uri: &Uri) -> String {
    percent_decode_str(uri.path()).decode_utf8_lossy().into_owned()
}

fn header_values(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        values
            .entry(name.as_str().to_owned())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    values
}

/// Write `record` as a structured log line.
///
/// Never fails; if the headers cannot be rendered the line is still
/// written without them.
pub fn emit(record: &ObservationRecord) {
    let headers = serde_json::to_string(&record.headers).unwrap_or_else(|e| {
        warn!(error = %e, "failed to render request headers for logging");
        String::new()
    });

    info!(
        ip = %record.remote_addr,
        method = %record.method,
        path = %record.path,
        content_type = %record.content_type,
        headers = %headers,
        observed_at = %record.observed_at.to_rfc3339(),
        "New inbound HTTP request"
    );
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request() -> Request<Body> {
        Request::get("/internal/metadata.json")
            .header("user-agent", "curl/8.0")
            .header("x-forwarded-for", "10.0.0.1")
            .header("x-forwarded-for", "10.0.0.2")
            .body(Body::empty())
            .unwrap_or_default()
    }

    #[test]
    fn captures_path_method_and_headers() {
        let record = capture(&request(), "application/json");
        assert_eq!(record.path, "/internal/metadata.json");
        assert_eq!(record.method, "GET");
        assert_eq!(record.content_type, "application/json");
        assert_eq!(record.remote_addr, UNKNOWN_REMOTE_ADDR);
        assert_eq!(
            record.headers.get("x-forwarded-for"),
            Some(&vec!["10.0.0.1".to_owned(), "10.0.0.2".to_owned()])
        );
        assert_eq!(
            record.headers.get("user-agent"),
            Some(&vec!["curl/8.0".to_owned()])
        );
    }

    #[test]
    fn captures_connect_info() {
        let mut req = request();
        let addr: SocketAddr = ([192, 0, 2, 7], 4242).into();
        req.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(capture(&req, "text/plain").remote_addr, "192.0.2.7:4242");
    }

    #[test]
    fn json_uses_operator_field_names() {
        let record = capture(&request(), "application/json");
        let json: serde_json::Value =
            serde_json::from_str(&record.to_json().unwrap_or_default()).unwrap_or_default();
        assert_eq!(json["IP"], UNKNOWN_REMOTE_ADDR);
        assert_eq!(json["Path"], "/internal/metadata.json");
        assert_eq!(json["Response Content-Type"], "application/json");
        assert_eq!(json["Headers"]["user-agent"][0], "curl/8.0");
    }

    #[test]
    fn path_is_percent_decoded() {
        let req = Request::get("/foo%2Ejson?x=%41")
            .body(Body::empty())
            .unwrap_or_default();
        assert_eq!(request_path(req.uri()), "/foo.json");
        assert_eq!(capture(&req, "application/json").path, "/foo.json");

        let uri: Uri = "/a%20b/%E2%9C%93.txt".parse().unwrap_or_default();
        assert_eq!(request_path(&uri), "/a b/\u{2713}.txt");

        let uri: Uri = "/bad%FF.csv".parse().unwrap_or_default();
        assert_eq!(request_path(&uri), "/bad\u{fffd}.csv");
    }

    #[test]
    fn emit_does_not_panic_without_subscriber() {
        emit(&capture(&request(), "text/plain"));
    }
}
