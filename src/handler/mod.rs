//! Request handler module
//!
//! Turns an inbound request into a response: static assets, preflight, and
//! dispatch through the site route table.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
