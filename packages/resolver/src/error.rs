use workbench_store::StoreError;

/// Errors raised while resolving a request.
///
/// A missing file is not an error; it resolves to a 404 response.
#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}
