//! Career portal web front-end
//!
//! Serves the site's informational pages from templates, redirects the chat
//! page to the hosted chat webhook, and echoes any other single-segment path.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
pub mod templates;
