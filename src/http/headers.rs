//! Default response headers
//!
//! Every response leaving the server carries the `Server` header and, when
//! cross-origin access is enabled, a wildcard `Access-Control-Allow-Origin`.

use crate::config::HttpConfig;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, SERVER};
use hyper::Response;

/// Stamp the site-wide headers onto a response
pub fn apply_default_headers<B>(resp: &mut Response<B>, http: &HttpConfig) {
    let headers = resp.headers_mut();

    if let Ok(server) = HeaderValue::from_str(&http.server_name) {
        headers.insert(SERVER, server);
    }
    if http.enable_cors {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
}
