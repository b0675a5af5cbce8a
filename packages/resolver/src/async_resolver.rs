//! [`Resolver`](crate::Resolver) over an [`AsyncRecordStore`].

use http::{Method, Request};
use workbench_store::AsyncRecordStore;

use crate::resolver::{finish, not_found, Plan};
use crate::{Resolution, ResolverConfig, Result};

/// Same URL mapping as [`Resolver`](crate::Resolver), with every store read
/// awaited. This is what the preview server runs.
///
/// # Example
///
/// ```rust
/// use workbench_resolver::{AsyncResolver, ResolverConfig};
/// use workbench_store::{FileRecord, MemoryStore, Payload, SyncToAsync};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let store = MemoryStore::with_records([FileRecord::file(
///     "ws/index.html",
///     Payload::new("<h1>hi</h1>", None),
/// )]);
/// let resolver = AsyncResolver::new(SyncToAsync::new(store), ResolverConfig::default());
///
/// let resolution = resolver.resolve_url("/debug/ws/").await.unwrap();
/// assert_eq!(resolution.status(), Some(http::StatusCode::OK));
/// # });
/// ```
pub struct AsyncResolver<S> {
    store: S,
    config: ResolverConfig,
}

impl<S: AsyncRecordStore> AsyncResolver<S> {
    pub fn new(store: S, config: ResolverConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn resolve<B>(&self, request: &Request<B>) -> Result<Resolution> {
        let url = request.uri().to_string();
        let head = *request.method() == Method::HEAD;
        let resolution = self.resolve_url(&url).await?;
        Ok(if head {
            resolution.without_body()
        } else {
            resolution
        })
    }

    pub async fn resolve_url(&self, url: &str) -> Result<Resolution> {
        let lookup = match Plan::new(&self.config, url)? {
            Plan::Declined => return Ok(Resolution::Declined),
            Plan::NotFound => return finish(url, not_found()),
            Plan::Lookup(lookup) => lookup,
        };

        let mut found = self.store.get_async(lookup.candidate()).await?;
        let mut via_fallback = false;
        if found.is_none() {
            if let Some(guessed) = lookup.fallback_key() {
                found = self.store.get_async(&guessed).await?;
                via_fallback = true;
            }
        }
        finish(url, lookup.respond(found, via_fallback))
    }
}
