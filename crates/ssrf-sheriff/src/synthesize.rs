//! Response body synthesis.
//!
//! Every text kind leaks the secret token in its body. Media kinds are
//! served verbatim from the [`AssetStore`] and rely on the
//! `X-Secret-Token` header alone.
//!
//! Synthesis never fails. A missing asset or an impossible serialization
//! error produces an empty body and the request still succeeds.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::assets::AssetStore;
use crate::format::ResponseKind;

/// Body shape shared by the JSON and XML representations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBody<'a> {
    /// The secret token.
    pub token: &'a str,
}

/// Build the response body for `kind`.
pub async fn synthesize(kind: ResponseKind, token: &str, assets: &AssetStore) -> Vec<u8> {
    let tok = token.as_bytes();
    match kind {
        ResponseKind::Json => json_body(token),
        ResponseKind::Xml => xml_body(token).into_bytes(),
        // The HTML template references the token twice.
        ResponseKind::Html => render_template(&load_asset(kind, assets).await, &[tok, tok]),
        ResponseKind::Csv => render_template(&load_asset(kind, assets).await, &[tok]),
        ResponseKind::PlainText => format!("token={token}").into_bytes(),
        ResponseKind::Gif
        | ResponseKind::Png
        | ResponseKind::Jpeg
        | ResponseKind::Mp3
        | ResponseKind::Mp4 => load_asset(kind, assets).await,
        ResponseKind::Default => tok.to_vec(),
    }
}

async fn load_asset(kind: ResponseKind, assets: &AssetStore) -> Vec<u8> {
    match kind.asset_name() {
        Some(name) => assets.load(name).await,
        None => Vec::new(),
    }
}

fn json_body(token: &str) -> Vec<u8> {
    serde_json::to_vec(&TokenBody { token }).unwrap_or_else(|e| {
        warn!(error = %e, "failed to serialize JSON token body");
        Vec::new()
    })
}

/// `<response><token>TOKEN</token></response>`, escaped.
pub fn xml_body(token: &str) -> String {
    format!("<response><token>{}</token></response>", escape_xml(token))
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Fill printf-style `%s` slots in order.
///
/// `%%` renders a literal `%`. Slots left over once `args` is exhausted
/// are copied through unchanged; surplus `args` are ignored.
pub fn render_template(template: &[u8], args: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(template.len());
    let mut args = args.iter();
    let mut bytes = template.iter().copied().peekable();

    while let Some(byte) = bytes.next() {
        if byte != b'%' {
            out.push(byte);
            continue;
        }
        match bytes.peek().copied() {
            Some(b's') => {
                bytes.next();
                match args.next() {
                    Some(arg) => out.extend_from_slice(arg),
                    None => out.extend_from_slice(b"%s"),
                }
            }
            Some(b'%') => {
                bytes.next();
                out.push(b'%');
            }
            _ => out.push(b'%'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_assets() -> AssetStore {
        AssetStore::new("/nonexistent/ssrf-sheriff/templates")
    }

    #[test]
    fn csv_single_slot() {
        let body = render_template(b"token,\n%s,\n", &[b"tok".as_slice()]);
        assert_eq!(body, b"token,\ntok,\n".to_vec());
    }

    #[test]
    fn html_two_slots() {
        let body = render_template(b"<title>%s</title><p>%s</p>", &[b"t1".as_slice(), b"t1".as_slice()]);
        assert_eq!(body, b"<title>t1</title><p>t1</p>".to_vec());
    }

    #[test]
    fn literal_percent_and_leftover_slots() {
        assert_eq!(render_template(b"100%% %s", &[b"x".as_slice()]), b"100% x".to_vec());
        assert_eq!(render_template(b"%s %s", &[b"x".as_slice()]), b"x %s".to_vec());
        assert_eq!(render_template(b"50% off %d", &[]), b"50% off %d".to_vec());
        assert_eq!(render_template(b"end %", &[]), b"end %".to_vec());
    }

    #[test]
    fn xml_is_escaped() {
        assert_eq!(
            xml_body("a<b>&\"c'"),
            "<response><token>a&lt;b&gt;&amp;&quot;c&apos;</token></response>"
        );
    }

    #[tokio::test]
    async fn json_body_shape() {
        let body = synthesize(ResponseKind::Json, "abc123", &no_assets()).await;
        assert_eq!(body, br#"{"token":"abc123"}"#.to_vec());
    }

    #[tokio::test]
    async fn plain_and_default() {
        let assets = no_assets();
        assert_eq!(
            synthesize(ResponseKind::PlainText, "abc", &assets).await,
            b"token=abc".to_vec()
        );
        assert_eq!(
            synthesize(ResponseKind::Default, "abc", &assets).await,
            b"abc".to_vec()
        );
    }

    #[tokio::test]
    async fn missing_assets_give_empty_bodies() {
        let assets = no_assets();
        for kind in ResponseKind::ALL {
            if kind.asset_name().is_some() {
                assert!(synthesize(kind, "abc", &assets).await.is_empty(), "{kind:?}");
            }
        }
    }
}
