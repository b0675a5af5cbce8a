//! Preview server: the resolver behind a small blocking HTTP server.

use std::io::Cursor;

use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::StatusCode;
use tiny_http::{Header, Server};
use tracing::{error, info, warn};
use workbench_resolver::{AsyncResolver, Resolution};
use workbench_store::{AsyncRecordStore, RecordStore, SyncToAsync};

use crate::args::ServeArgs;
use crate::CliError;

/// Serve until the process is killed.
///
/// `store` should be a connection of its own; the server never touches the
/// editing context's state. Requests are resolved one at a time on a
/// single-threaded runtime.
pub fn serve<S: RecordStore + 'static>(store: S, args: &ServeArgs) -> Result<(), CliError> {
    let resolver = AsyncResolver::new(SyncToAsync::new(store), args.resolver.config());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| CliError::Server {
            message: format!("failed to start runtime: {}", e),
        })?;
    let server = Server::http(&args.addr).map_err(|e| CliError::Server {
        message: format!("failed to bind {}: {}", args.addr, e),
    })?;

    info!(
        addr = %args.addr,
        root = %resolver.config().debug_root,
        "serving workspaces"
    );

    for request in server.incoming_requests() {
        // tiny_http drops the body of HEAD responses itself
        let response = runtime.block_on(handle(&resolver, request.url()));
        let status = response.status();
        if let Err(e) = request.respond(to_tiny(response)) {
            warn!(error = %e, %status, "failed to send response");
        }
    }
    Ok(())
}

/// Answer one request URL.
///
/// URLs outside the debug root get a plain 404; there is nothing else to
/// fall through to here.
pub async fn handle<S: AsyncRecordStore>(
    resolver: &AsyncResolver<S>,
    url: &str,
) -> http::Response<Bytes> {
    match resolver.resolve_url(url).await {
        Ok(Resolution::Response(response)) => response,
        Ok(Resolution::Declined) => text(
            StatusCode::NOT_FOUND,
            format!("not under {}", resolver.config().debug_root),
        ),
        Err(e) => {
            error!(%url, error = %e, "resolve failed");
            text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn text(status: StatusCode, body: String) -> http::Response<Bytes> {
    let mut response = http::Response::new(Bytes::from(body));
    *response.status_mut() = status;
    response
}

/// Convert to a tiny_http response. tiny_http computes `Content-Length`.
pub fn to_tiny(response: http::Response<Bytes>) -> tiny_http::Response<Cursor<Vec<u8>>> {
    let (parts, body) = response.into_parts();
    let mut tiny = tiny_http::Response::from_data(body.to_vec()).with_status_code(parts.status.as_u16());
    for (name, value) in parts.headers.iter() {
        if name == CONTENT_LENGTH {
            continue;
        }
        match Header::from_bytes(name.as_str().as_bytes(), value.as_bytes()) {
            Ok(header) => tiny.add_header(header),
            Err(()) => warn!(header = %name, "dropping header tiny_http cannot carry"),
        }
    }
    tiny
}

#[cfg(test)]
mod tests {
    use super::*;
    use workbench_resolver::ResolverConfig;
    use workbench_store::{AsyncRewrite, FileRecord, KeyRange, MemoryStore, MimeType, Payload, StoreError};

    fn resolver() -> AsyncResolver<SyncToAsync<MemoryStore>> {
        let store = MemoryStore::with_records([
            FileRecord::file(
                "workspace1/index.html",
                Payload::new("<h1>hi</h1>", Some(MimeType::HTML)),
            ),
            FileRecord::folder("workspace1/images"),
        ]);
        AsyncResolver::new(SyncToAsync::new(store), ResolverConfig::default())
    }

    fn header<'a>(response: &'a tiny_http::Response<Cursor<Vec<u8>>>, name: &str) -> Option<&'a str> {
        response
            .headers()
            .iter()
            .find(|h| h.field.to_string().eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    #[tokio::test]
    async fn file_becomes_tiny_response() {
        let response = to_tiny(handle(&resolver(), "/debug/workspace1/").await);
        assert_eq!(response.status_code().0, 200);
        assert_eq!(header(&response, "Content-Type"), Some("text/html"));
        assert_eq!(header(&response, "Content-Length"), None);
        assert_eq!(response.data_length(), Some(11));
    }

    #[tokio::test]
    async fn redirect_keeps_location() {
        let response = to_tiny(handle(&resolver(), "/debug/workspace1/images").await);
        assert_eq!(response.status_code().0, 301);
        assert_eq!(
            header(&response, "Location"),
            Some("/debug/workspace1/images/")
        );
    }

    #[tokio::test]
    async fn outside_root_is_plain_not_found() {
        let response = handle(&resolver(), "/favicon.ico").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), &Bytes::from_static(b"not under /debug/"));
    }

    struct Unreadable;

    #[async_trait::async_trait]
    impl AsyncRecordStore for Unreadable {
        async fn get_async(&self, _key: &str) -> workbench_store::Result<Option<FileRecord>> {
            Err(StoreError::Poisoned)
        }

        async fn insert_async(&self, _record: FileRecord) -> workbench_store::Result<()> {
            Err(StoreError::Poisoned)
        }

        async fn update_async(&self, _record: FileRecord) -> workbench_store::Result<bool> {
            Err(StoreError::Poisoned)
        }

        async fn scan_async(&self, _range: &KeyRange) -> workbench_store::Result<Vec<FileRecord>> {
            Err(StoreError::Poisoned)
        }

        async fn delete_async(&self, _range: &KeyRange) -> workbench_store::Result<Vec<String>> {
            Err(StoreError::Poisoned)
        }

        async fn rewrite_async(
            &self,
            _range: &KeyRange,
            _f: &mut AsyncRewrite<'_>,
        ) -> workbench_store::Result<Vec<(String, String)>> {
            Err(StoreError::Poisoned)
        }
    }

    #[tokio::test]
    async fn store_failure_is_server_error() {
        let resolver = AsyncResolver::new(Unreadable, ResolverConfig::default());
        let response = handle(&resolver, "/debug/workspace1/index.html").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.body(),
            &Bytes::from_static(b"Store error: lock poisoned")
        );
    }
}
