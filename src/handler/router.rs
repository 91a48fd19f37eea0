//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: body-size guard, static assets,
//! preflight, then the route table. Default headers and access logging are
//! applied to every response on the way out.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::header::{self, HeaderMap};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();
    let req = Request::from_parts(parts, ());
    let is_head = req.method() == Method::HEAD;

    logger::log_debug(&format!(
        "{} {} {:?} from {remote_addr}",
        req.method(),
        req.uri(),
        req.version()
    ));

    let mut response = route_request(&req, &state).await;

    if is_head {
        *response.body_mut() = Full::new(Bytes::new());
    }
    http::apply_default_headers(&mut response, &state.config.http);

    if state.config.logging.access_log {
        log_access(&req, &response, remote_addr, started, &state);
    }

    Ok(response)
}

/// Route request to the static handler or the route table
async fn route_request(req: &Request<()>, state: &AppState) -> Response<Full<Bytes>> {
    let method = req.method();
    let path = req.uri().path();
    let headers = req.headers();
    let enable_cors = state.config.http.enable_cors;
    let requested_headers = header_str(headers, header::ACCESS_CONTROL_REQUEST_HEADERS);

    // 1. Check body size
    if let Some(resp) = check_body_size(headers, state.config.http.max_body_size) {
        return resp;
    }

    // 2. Static assets
    let site = &state.config.site;
    if let Some(relative) = static_files::strip_static_prefix(path, &site.static_prefix) {
        return static_files::serve_static(
            method,
            relative,
            &site.static_dir,
            header_str(headers, header::IF_NONE_MATCH),
            enable_cors,
            requested_headers,
        )
        .await;
    }

    // 3. Preflight: advertise the matched route's methods
    if method == Method::OPTIONS {
        return state.router.find(path).map_or_else(http::build_404_response, |matched| {
            http::build_options_response(
                &matched.route.allowed_methods(),
                enable_cors,
                requested_headers,
            )
        });
    }

    // 4. Route table
    match state.router.dispatch(method, path, &state.templates).await {
        Ok(resp) => resp,
        Err(err) => {
            if err.is_server_fault() {
                logger::log_error(&format!("{method} {path}: {err}"));
            }
            http::build_error_response(&err)
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get(header::CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn log_access(
    req: &Request<()>,
    response: &Response<Full<Bytes>>,
    remote_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_str(req.headers(), header::REFERER).map(ToString::to_string);
    entry.user_agent = header_str(req.headers(), header::USER_AGENT).map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}
