//! Request URL normalization.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::Result;

/// Characters escaped when text is appended to a URL path.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A request URL with query and fragment removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    /// `scheme://host[:port]` for absolute URLs.
    pub origin: Option<String>,
    /// The path as it arrived, still percent-encoded.
    pub raw_path: String,
    /// The percent-decoded path.
    pub path: String,
}

impl Target {
    /// Accepts an absolute URL or an origin-relative path.
    pub fn parse(url: &str) -> Result<Self> {
        let (origin, raw_path) = if url.starts_with('/') {
            let end = url.find(['?', '#']).unwrap_or(url.len());
            (None, url[..end].to_string())
        } else {
            let parsed = Url::parse(url)?;
            (
                Some(parsed.origin().ascii_serialization()),
                parsed.path().to_string(),
            )
        };
        let path = percent_decode_str(&raw_path).decode_utf8_lossy().into_owned();
        Ok(Self {
            origin,
            raw_path,
            path,
        })
    }

    /// The request URL plus `extra` and a trailing `/`, for a folder
    /// redirect.
    pub fn redirect_location(&self, extra: &str) -> String {
        format!(
            "{}{}{}/",
            self.origin.as_deref().unwrap_or(""),
            self.raw_path,
            utf8_percent_encode(extra, PATH)
        )
    }
}
