//! HTTP protocol layer module
//!
//! Response builders, default headers, MIME lookup and cache validators,
//! decoupled from routing.

pub mod cache;
pub mod headers;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use headers::apply_default_headers;
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_500_response, build_error_response, build_html_response, build_options_response,
    build_redirect_response, build_static_response, format_allow,
};
