//! Request to response mapping.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use http::{Method, Request, Response, StatusCode};
use tracing::debug;
use workbench_store::{FileRecord, Payload, RecordStore};
use workbench_vfs::mime;

use crate::target::Target;
use crate::{ResolverConfig, Result};

/// Outcome of resolving one request.
#[derive(Debug)]
pub enum Resolution {
    /// The URL is outside the debug root. Somebody else should answer it.
    Declined,
    Response(Response<Bytes>),
}

impl Resolution {
    pub fn is_declined(&self) -> bool {
        matches!(self, Resolution::Declined)
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Resolution::Declined => None,
            Resolution::Response(response) => Some(response.status()),
        }
    }

    pub fn into_response(self) -> Option<Response<Bytes>> {
        match self {
            Resolution::Declined => None,
            Resolution::Response(response) => Some(response),
        }
    }

    /// Same status and headers, empty body.
    pub(crate) fn without_body(self) -> Self {
        match self {
            Resolution::Response(response) => {
                Resolution::Response(response.map(|_| Bytes::new()))
            }
            declined => declined,
        }
    }
}

/// What a URL asks of the store, worked out before any read.
pub(crate) enum Plan {
    Declined,
    NotFound,
    Lookup(Lookup),
}

impl Plan {
    pub(crate) fn new(config: &ResolverConfig, url: &str) -> Result<Self> {
        let target = Target::parse(url)?;
        let root = config.debug_root.as_str();

        let suffix = match target.path.strip_prefix(root) {
            Some(suffix) => suffix,
            // the bare root without its slash is ours but names nothing
            None if target.path == root.trim_end_matches('/') => "",
            None => return Ok(Plan::Declined),
        };
        if suffix.is_empty() && !target.path.ends_with('/') {
            return Ok(Plan::NotFound);
        }

        let candidate = if suffix.is_empty() || suffix.ends_with('/') {
            format!("{}{}", suffix, config.index_file)
        } else {
            suffix.to_string()
        };
        let fallback = match &config.fallback_extension {
            Some(ext) if !suffix.ends_with('/') && mime::extension(&candidate).is_none() => {
                Some(format!(".{}", ext))
            }
            _ => None,
        };
        Ok(Plan::Lookup(Lookup {
            target,
            candidate,
            fallback,
        }))
    }
}

/// The one or two keys a request may be answered from.
pub(crate) struct Lookup {
    target: Target,
    candidate: String,
    /// `.ext` to append when the candidate is missing.
    fallback: Option<String>,
}

impl Lookup {
    pub(crate) fn candidate(&self) -> &str {
        &self.candidate
    }

    pub(crate) fn fallback_key(&self) -> Option<String> {
        let guessed = format!("{}{}", self.candidate, self.fallback.as_deref()?);
        debug!(candidate = %self.candidate, %guessed, "trying fallback extension");
        Some(guessed)
    }

    pub(crate) fn respond(
        &self,
        found: Option<FileRecord>,
        via_fallback: bool,
    ) -> std::result::Result<Response<Bytes>, http::Error> {
        match found {
            None => not_found(),
            Some(record) => match record.served_payload(true) {
                Some(payload) => file_response(payload),
                None => {
                    let extra = match (&self.fallback, via_fallback) {
                        (Some(suffix), true) => suffix.as_str(),
                        _ => "",
                    };
                    redirect(&self.target.redirect_location(extra))
                }
            },
        }
    }
}

/// Serves the store under a URL prefix.
///
/// `<debug_root><workspace>/<path>` maps to the record keyed
/// `<workspace>/<path>`, so every workspace is reachable without switching.
///
/// Each lookup is its own store read. A request that overlaps a move or a
/// delete running in another context may see the tree before, after, or
/// (for the fallback lookup) partly through that change.
pub struct Resolver<S> {
    store: S,
    config: ResolverConfig,
}

impl<S: RecordStore> Resolver<S> {
    pub fn new(store: S, config: ResolverConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve an HTTP request. `HEAD` gets the `GET` status and headers
    /// with an empty body.
    pub fn resolve<B>(&self, request: &Request<B>) -> Result<Resolution> {
        let resolution = self.resolve_url(&request.uri().to_string())?;
        if *request.method() == Method::HEAD {
            return Ok(resolution.without_body());
        }
        Ok(resolution)
    }

    /// Resolve a request URL, absolute or origin-relative, as a `GET`.
    pub fn resolve_url(&self, url: &str) -> Result<Resolution> {
        let lookup = match Plan::new(&self.config, url)? {
            Plan::Declined => return Ok(Resolution::Declined),
            Plan::NotFound => return finish(url, not_found()),
            Plan::Lookup(lookup) => lookup,
        };

        let mut found = self.store.get(lookup.candidate())?;
        let mut via_fallback = false;
        if found.is_none() {
            if let Some(guessed) = lookup.fallback_key() {
                found = self.store.get(&guessed)?;
                via_fallback = true;
            }
        }
        finish(url, lookup.respond(found, via_fallback))
    }
}

pub(crate) fn finish(
    url: &str,
    response: std::result::Result<Response<Bytes>, http::Error>,
) -> Result<Resolution> {
    let response = response?;
    debug!(%url, status = response.status().as_u16(), "resolved");
    Ok(Resolution::Response(response))
}

fn file_response(payload: &Payload) -> std::result::Result<Response<Bytes>, http::Error> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_LENGTH, payload.len());
    if let Some(mime_type) = &payload.mime_type {
        builder = builder.header(CONTENT_TYPE, mime_type.as_str());
    }
    builder.body(payload.bytes.clone())
}

fn redirect(location: &str) -> std::result::Result<Response<Bytes>, http::Error> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, location)
        .header(CONTENT_LENGTH, 0)
        .body(Bytes::new())
}

pub(crate) fn not_found() -> std::result::Result<Response<Bytes>, http::Error> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(CONTENT_LENGTH, 0)
        .body(Bytes::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use workbench_store::{FileRecord, MemoryStore, MimeType};

    fn resolver(records: impl IntoIterator<Item = FileRecord>) -> Resolver<MemoryStore> {
        Resolver::new(MemoryStore::with_records(records), ResolverConfig::default())
    }

    fn file(path: &str, body: &'static str, mime: Option<MimeType>) -> FileRecord {
        FileRecord::file(path, Payload::new(body, mime))
    }

    #[test]
    fn outside_root_is_declined() {
        let resolver = resolver([]);
        assert!(resolver.resolve_url("/app/main.js").unwrap().is_declined());
        assert!(resolver.resolve_url("/debugger/x").unwrap().is_declined());
    }

    #[test]
    fn bare_root_is_not_found() {
        let resolver = resolver([]);
        assert_eq!(
            resolver.resolve_url("/debug").unwrap().status(),
            Some(StatusCode::NOT_FOUND)
        );
    }

    #[test]
    fn serves_derived_payload_first() {
        let resolver = resolver([file("ws/a.ts", "let a: number", Some(MimeType::TYPESCRIPT))
            .with_dist_file(Payload::new("let a", Some(MimeType::JAVASCRIPT)))]);

        let response = resolver
            .resolve_url("/debug/ws/a.ts")
            .unwrap()
            .into_response()
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/javascript");
        assert_eq!(response.body(), &Bytes::from_static(b"let a"));
    }

    #[test]
    fn unknown_type_has_no_content_type() {
        let resolver = resolver([file("ws/Makefile", "all:", None)]);
        let response = resolver
            .resolve_url("/debug/ws/Makefile")
            .unwrap()
            .into_response()
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(response.headers()[CONTENT_LENGTH], "4");
    }

    #[test]
    fn fallback_is_tried_once() {
        let resolver = resolver([file("ws/util.ts.ts", "nested", None)]);
        // `util` -> `util.ts` only; never `util.ts.ts`
        assert_eq!(
            resolver.resolve_url("/debug/ws/util").unwrap().status(),
            Some(StatusCode::NOT_FOUND)
        );
    }

    #[test]
    fn no_fallback_when_name_has_extension() {
        let resolver = resolver([file("ws/app.min.ts", "x", None)]);
        assert_eq!(
            resolver.resolve_url("/debug/ws/app.min").unwrap().status(),
            Some(StatusCode::NOT_FOUND)
        );
    }

    #[test]
    fn fallback_disabled() {
        let resolver = Resolver::new(
            MemoryStore::with_records([file("ws/util.ts", "x", None)]),
            ResolverConfig::default().without_fallback(),
        );
        assert_eq!(
            resolver.resolve_url("/debug/ws/util").unwrap().status(),
            Some(StatusCode::NOT_FOUND)
        );
    }

    #[test]
    fn fallback_hit_on_folder_redirects_with_extension() {
        let resolver = resolver([FileRecord::folder("ws/pkg.ts")]);
        let response = resolver
            .resolve_url("/debug/ws/pkg")
            .unwrap()
            .into_response()
            .unwrap();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "/debug/ws/pkg.ts/");
    }

    #[test]
    fn workspace_root_redirects() {
        let resolver = resolver([FileRecord::folder("ws")]);
        let response = resolver
            .resolve_url("/debug/ws")
            .unwrap()
            .into_response()
            .unwrap();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "/debug/ws/");
    }

    #[test]
    fn head_has_headers_but_no_body() {
        let resolver = resolver([file("ws/index.html", "<h1>hi</h1>", Some(MimeType::HTML))]);
        let request = Request::head("/debug/ws/").body(()).unwrap();

        let response = resolver.resolve(&request).unwrap().into_response().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LENGTH], "11");
        assert!(response.body().is_empty());
    }

    #[test]
    fn percent_encoded_names() {
        let resolver = resolver([file("ws/my file.txt", "spaced", Some(MimeType::PLAIN_TEXT))]);
        let response = resolver
            .resolve_url("/debug/ws/my%20file.txt?download=1")
            .unwrap()
            .into_response()
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), &Bytes::from_static(b"spaced"));
    }
}
