//! Routing module
//!
//! Path-pattern route table for the portal:
//! - Literal and single-placeholder patterns
//! - Template, redirect and echo actions
//! - Literal-before-catch-all dispatch

mod action;
mod pattern;
mod router;
pub mod site;

pub use action::Action;
pub use pattern::{decode_path, RoutePattern};
pub use router::{Route, RouteMatch, Router, RouterBuilder};
pub use site::{site_router, CHAT_WEBHOOK_URL};
