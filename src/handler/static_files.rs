//! Static file serving module
//!
//! Serves site assets (stylesheets, the chat widget script, images) from the
//! configured static directory under the static URL prefix.

use crate::http::{self, cache, mime};
use crate::logger;
use crate::routing::decode_path;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};
use std::path::{Path, PathBuf};
use tokio::fs;

const ASSET_METHODS: &[Method] = &[Method::GET, Method::HEAD, Method::OPTIONS];

/// Return the asset path relative to the static prefix, if `path` is under it
///
/// The bare prefix (`/static`) is not an asset path.
pub fn strip_static_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let prefix = prefix.trim_end_matches('/');
    path.strip_prefix(prefix)?.strip_prefix('/')
}

/// Serve an asset request
pub async fn serve_static(
    method: &Method,
    relative: &str,
    static_dir: &str,
    if_none_match: Option<&str>,
    enable_cors: bool,
    requested_headers: Option<&str>,
) -> Response<Full<Bytes>> {
    match *method {
        Method::GET | Method::HEAD => {}
        Method::OPTIONS => {
            return http::build_options_response(ASSET_METHODS, enable_cors, requested_headers);
        }
        _ => return http::build_405_response(ASSET_METHODS),
    }

    let Some((content, file_path)) = load_asset(static_dir, relative).await else {
        return http::build_404_response();
    };

    let etag = cache::generate_etag(&content);
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    http::build_static_response(
        Bytes::from(content),
        mime::content_type_for(&file_path),
        &etag,
    )
}

/// Load an asset, refusing anything that resolves outside `static_dir`
async fn load_asset(static_dir: &str, relative: &str) -> Option<(Vec<u8>, PathBuf)> {
    let relative = decode_path(relative);
    if relative.is_empty() || relative.split('/').any(|seg| seg == "..") {
        return None;
    }

    let static_root = match fs::canonicalize(static_dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{static_dir}': {e}"
            ));
            return None;
        }
    };

    // File not found is common (404), no need to log
    let file_path = fs::canonicalize(Path::new(static_dir).join(&relative))
        .await
        .ok()?;
    if !file_path.starts_with(&static_root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {relative} -> {}",
            file_path.display()
        ));
        return None;
    }

    if !fs::metadata(&file_path).await.ok()?.is_file() {
        return None;
    }

    match fs::read(&file_path).await {
        Ok(content) => Some((content, file_path)),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    const CHAT_JS: &str = "class ChatWidget {}";

    fn static_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("js")).unwrap();
        std::fs::write(dir.path().join("js/chat.js"), CHAT_JS).unwrap();
        dir
    }

    #[test]
    fn test_strip_static_prefix() {
        assert_eq!(strip_static_prefix("/static/js/chat.js", "/static"), Some("js/chat.js"));
        assert_eq!(strip_static_prefix("/static/js/chat.js", "/static/"), Some("js/chat.js"));
        assert_eq!(strip_static_prefix("/static", "/static"), None);
        assert_eq!(strip_static_prefix("/statics/x", "/static"), None);
        assert_eq!(strip_static_prefix("/quiz", "/static"), None);
    }

    #[tokio::test]
    async fn test_serve_chat_widget() {
        let dir = static_dir();
        let root = dir.path().to_str().unwrap();

        let resp = serve_static(&Method::GET, "js/chat.js", root, None, true, None).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "text/javascript; charset=utf-8");
        assert!(resp.headers().contains_key("etag"));
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], CHAT_JS.as_bytes());
    }

    #[tokio::test]
    async fn test_conditional_request_returns_304() {
        let dir = static_dir();
        let root = dir.path().to_str().unwrap();
        let etag = cache::generate_etag(CHAT_JS.as_bytes());

        let resp = serve_static(&Method::GET, "js/chat.js", root, Some(&etag), true, None).await;
        assert_eq!(resp.status(), 304);
    }

    #[tokio::test]
    async fn test_missing_traversal_and_directory_are_404() {
        let dir = static_dir();
        let root = dir.path().to_str().unwrap();

        for relative in ["js/missing.js", "../portal-secret.txt", "js/%2E%2E/../x", "js", ""] {
            let resp = serve_static(&Method::GET, relative, root, None, true, None).await;
            assert_eq!(resp.status(), 404, "relative: {relative}");
        }
    }

    #[tokio::test]
    async fn test_asset_methods() {
        let dir = static_dir();
        let root = dir.path().to_str().unwrap();

        let resp = serve_static(&Method::POST, "js/chat.js", root, None, true, None).await;
        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers()["allow"], "GET, HEAD, OPTIONS");

        let resp = serve_static(&Method::OPTIONS, "js/chat.js", root, None, true, None).await;
        assert_eq!(resp.status(), 204);
    }
}
