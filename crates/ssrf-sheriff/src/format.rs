//! Format resolution for inbound canary requests.
//!
//! Maps the file extension of a request path to a [`ResponseKind`] and a
//! MIME content type. The kind table is matched case-sensitively; the
//! content type comes from the standard [`mime_guess`] extension table.
//!
//! | Extension | Kind |
//! |-----------|------|
//! | `.json` | [`ResponseKind::Json`] |
//! | `.xml` | [`ResponseKind::Xml`] |
//! | `.html` | [`ResponseKind::Html`] |
//! | `.csv` | [`ResponseKind::Csv`] |
//! | `.txt` | [`ResponseKind::PlainText`] |
//! | `.gif` | [`ResponseKind::Gif`] |
//! | `.png` | [`ResponseKind::Png`] |
//! | `.jpg`, `.jpeg` | [`ResponseKind::Jpeg`] |
//! | `.mp3` | [`ResponseKind::Mp3`] |
//! | `.mp4` | [`ResponseKind::Mp4`] |
//! | anything else | [`ResponseKind::Default`] |

/// Content type used when the extension has no known MIME mapping.
pub const FALLBACK_CONTENT_TYPE: &str = "text/plain";

/// The output representation selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// `{"token": "..."}`.
    Json,
    /// `<response><token>...</token></response>`.
    Xml,
    /// The `html.html` template with the token in both slots.
    Html,
    /// The `csv.csv` template with the token in its single slot.
    Csv,
    /// `token=...`.
    PlainText,
    /// Static `gif.gif` placeholder.
    Gif,
    /// Static `png.png` placeholder.
    Png,
    /// Static `jpeg.jpg` placeholder.
    Jpeg,
    /// Static `mp3.mp3` placeholder.
    Mp3,
    /// Static `mp4.mp4` placeholder.
    Mp4,
    /// Unrecognized or empty extension: the raw token.
    Default,
}

impl ResponseKind {
    /// Every variant, in table order.
    pub const ALL: [Self; 11] = [
        Self::Json,
        Self::Xml,
        Self::Html,
        Self::Csv,
        Self::PlainText,
        Self::Gif,
        Self::Png,
        Self::Jpeg,
        Self::Mp3,
        Self::Mp4,
        Self::Default,
    ];

    /// Look up the kind for an extension (including the leading dot).
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            ".json" => Self::Json,
            ".xml" => Self::Xml,
            ".html" => Self::Html,
            ".csv" => Self::Csv,
            ".txt" => Self::PlainText,
            ".gif" => Self::Gif,
            ".png" => Self::Png,
            ".jpg" | ".jpeg" => Self::Jpeg,
            ".mp3" => Self::Mp3,
            ".mp4" => Self::Mp4,
            _ => Self::Default,
        }
    }

    /// Name of the asset this kind is built from, if any.
    pub const fn asset_name(self) -> Option<&'static str> {
        match self {
            Self::Html => Some("html.html"),
            Self::Csv => Some("csv.csv"),
            Self::Gif => Some("gif.gif"),
            Self::Png => Some("png.png"),
            Self::Jpeg => Some("jpeg.jpg"),
            Self::Mp3 => Some("mp3.mp3"),
            Self::Mp4 => Some("mp4.mp4"),
            Self::Json | Self::Xml | Self::PlainText | Self::Default => None,
        }
    }

    /// Whether the body is served verbatim from a binary asset.
    ///
    /// Media bodies never contain the token; only the `X-Secret-Token`
    /// header and the logs carry it for these kinds.
    pub const fn is_static_media(self) -> bool {
        matches!(
            self,
            Self::Gif | Self::Png | Self::Jpeg | Self::Mp3 | Self::Mp4
        )
    }
}

/// The outcome of resolving a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Selected output representation.
    pub kind: ResponseKind,
    /// Value for the `Content-Type` response header.
    pub content_type: &'static str,
}

/// Resolve a request path into a response kind and content type.
///
/// Never fails: unknown extensions resolve to [`ResponseKind::Default`].
pub fn resolve(path: &str) -> Resolution {
    let ext = extension(path);
    Resolution {
        kind: ResponseKind::from_extension(ext),
        content_type: content_type(ext),
    }
}

/// Extract the extension of the final path segment, leading dot included.
///
/// Returns an empty string when the final segment has no dot.
pub fn extension(path: &str) -> &str {
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment
        .rfind('.')
        .and_then(|idx| segment.get(idx..))
        .unwrap_or("")
}

/// MIME type for an extension, or [`FALLBACK_CONTENT_TYPE`].
pub fn content_type(extension: &str) -> &'static str {
    extension
        .strip_prefix('.')
        .filter(|ext| !ext.is_empty())
        .and_then(|ext| mime_guess::from_ext(ext).first_raw())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}
