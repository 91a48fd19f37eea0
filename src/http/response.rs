//! HTTP response building module
//!
//! Builders for every status the portal emits. A builder failure (only
//! possible with an invalid header value) is logged and degrades to an empty
//! response with the intended status.

use crate::error::DispatchError;
use crate::templates::escape_html;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Build 200 HTML response
pub fn build_html_response(content: String) -> Response<Full<Bytes>> {
    let content_length = content.len();
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", HTML_CONTENT_TYPE)
        .header("Content-Length", content_length)
        .body(Full::new(Bytes::from(content)))
        .unwrap_or_else(|e| fallback(StatusCode::OK, &e))
}

/// Build 302 redirect response with a short advisory body
pub fn build_redirect_response(target: &str) -> Response<Full<Bytes>> {
    let escaped = escape_html(target);
    let body = format!(
        "<!doctype html>\n<title>Redirecting...</title>\n<h1>Redirecting...</h1>\n\
         <p>You should be redirected automatically to: <a href=\"{escaped}\">{escaped}</a></p>\n"
    );
    Response::builder()
        .status(StatusCode::FOUND)
        .header("Location", target)
        .header("Content-Type", HTML_CONTENT_TYPE)
        .header("Content-Length", body.len())
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| fallback(StatusCode::FOUND, &e))
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header("ETag", etag)
        .header("Cache-Control", "public, max-age=3600")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback(StatusCode::NOT_MODIFIED, &e))
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    plain(StatusCode::NOT_FOUND, "404 Not Found", None)
}

/// Build 405 Method Not Allowed response with the route's `Allow` list
pub fn build_405_response(allowed: &[Method]) -> Response<Full<Bytes>> {
    plain(
        StatusCode::METHOD_NOT_ALLOWED,
        "405 Method Not Allowed",
        Some(&format_allow(allowed)),
    )
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    plain(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large", None)
}

/// Build 500 response; the cause is never exposed to the client
pub fn build_500_response() -> Response<Full<Bytes>> {
    plain(
        StatusCode::INTERNAL_SERVER_ERROR,
        "500 Internal Server Error",
        None,
    )
}

/// Map a dispatch failure to its response
pub fn build_error_response(err: &DispatchError) -> Response<Full<Bytes>> {
    match err {
        DispatchError::NotFound => build_404_response(),
        DispatchError::MethodNotAllowed { allowed } => build_405_response(allowed),
        DispatchError::TemplateMissing(_) | DispatchError::Template(_) => build_500_response(),
    }
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(
    allowed: &[Method],
    enable_cors: bool,
    requested_headers: Option<&str>,
) -> Response<Full<Bytes>> {
    let allow = format_allow(allowed);
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", allow.as_str());

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Methods", allow.as_str())
            .header("Access-Control-Max-Age", "86400");
        if let Some(headers) = requested_headers {
            builder = builder.header("Access-Control-Allow-Headers", headers);
        }
    }

    builder
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback(StatusCode::NO_CONTENT, &e))
}

/// Build 200 static asset response with cache validators
pub fn build_static_response(data: Bytes, content_type: &str, etag: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", data.len())
        .header("ETag", etag)
        .header("Cache-Control", "public, max-age=3600")
        .body(Full::new(data))
        .unwrap_or_else(|e| fallback(StatusCode::OK, &e))
}

/// Render a method list as an `Allow` header value
pub fn format_allow(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn plain(status: StatusCode, body: &'static str, allow: Option<&str>) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", TEXT_CONTENT_TYPE);
    if let Some(allow) = allow {
        builder = builder.header("Allow", allow);
    }
    builder
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap_or_else(|e| fallback(status, &e))
}

fn fallback(status: StatusCode, error: &hyper::http::Error) -> Response<Full<Bytes>> {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = status;
    resp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_response() {
        let resp = build_redirect_response("https://example.com/chat?a=1&b=2");
        assert_eq!(resp.status(), 302);
        assert_eq!(resp.headers()["location"], "https://example.com/chat?a=1&b=2");
    }

    #[test]
    fn test_redirect_to_invalid_header_value_degrades() {
        let resp = build_redirect_response("https://example.com/\nbad");
        assert_eq!(resp.status(), 302);
        assert!(resp.headers().get("location").is_none());
    }

    #[test]
    fn test_405_lists_allowed_methods() {
        let resp = build_405_response(&[Method::GET, Method::HEAD, Method::OPTIONS]);
        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers()["allow"], "GET, HEAD, OPTIONS");
    }

    #[test]
    fn test_error_response_mapping() {
        assert_eq!(build_error_response(&DispatchError::NotFound).status(), 404);
        let resp = build_error_response(&DispatchError::TemplateMissing("quiz".to_string()));
        assert_eq!(resp.status(), 500);
    }

    #[test]
    fn test_options_response() {
        let resp = build_options_response(&[Method::GET, Method::OPTIONS], true, Some("x-token"));
        assert_eq!(resp.status(), 204);
        assert_eq!(resp.headers()["allow"], "GET, OPTIONS");
        assert_eq!(resp.headers()["access-control-allow-methods"], "GET, OPTIONS");
        assert_eq!(resp.headers()["access-control-allow-headers"], "x-token");

        let resp = build_options_response(&[Method::GET], false, None);
        assert!(resp.headers().get("access-control-allow-methods").is_none());
    }
}
