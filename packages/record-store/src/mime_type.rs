//! MIME type attached to stored payloads.

use std::borrow::Cow;
use std::fmt;

/// The media type a payload is served with.
///
/// A payload with no `MimeType` is served with whatever default the
/// container picks; that is not an error.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MimeType(pub Cow<'static, str>);

impl MimeType {
    pub const JAVASCRIPT: MimeType = MimeType(Cow::Borrowed("text/javascript"));
    pub const TYPESCRIPT: MimeType = MimeType(Cow::Borrowed("text/typescript"));
    pub const CSS: MimeType = MimeType(Cow::Borrowed("text/css"));
    pub const HTML: MimeType = MimeType(Cow::Borrowed("text/html"));
    pub const JSON: MimeType = MimeType(Cow::Borrowed("application/json"));
    pub const XML: MimeType = MimeType(Cow::Borrowed("application/xml"));
    pub const GIF: MimeType = MimeType(Cow::Borrowed("image/gif"));
    pub const PNG: MimeType = MimeType(Cow::Borrowed("image/png"));
    pub const JPEG: MimeType = MimeType(Cow::Borrowed("image/jpeg"));
    pub const SVG: MimeType = MimeType(Cow::Borrowed("image/svg+xml"));
    pub const WEBP: MimeType = MimeType(Cow::Borrowed("image/webp"));
    pub const ICON: MimeType = MimeType(Cow::Borrowed("image/x-icon"));
    pub const MPEG_AUDIO: MimeType = MimeType(Cow::Borrowed("audio/mpeg"));
    pub const WAV: MimeType = MimeType(Cow::Borrowed("audio/wav"));
    pub const OGG: MimeType = MimeType(Cow::Borrowed("audio/ogg"));
    pub const MP4: MimeType = MimeType(Cow::Borrowed("video/mp4"));
    pub const WEBM: MimeType = MimeType(Cow::Borrowed("video/webm"));
    pub const PDF: MimeType = MimeType(Cow::Borrowed("application/pdf"));
    pub const PLAIN_TEXT: MimeType = MimeType(Cow::Borrowed("text/plain"));
    pub const MARKDOWN: MimeType = MimeType(Cow::Borrowed("text/markdown"));

    /// Create a MIME type from a static string.
    pub const fn from_static(s: &'static str) -> Self {
        MimeType(Cow::Borrowed(s))
    }

    /// Create a MIME type from an owned string.
    pub fn new(s: impl Into<String>) -> Self {
        MimeType(Cow::Owned(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&'static str> for MimeType {
    fn from(s: &'static str) -> Self {
        MimeType(Cow::Borrowed(s))
    }
}

impl From<String> for MimeType {
    fn from(s: String) -> Self {
        MimeType(Cow::Owned(s))
    }
}
