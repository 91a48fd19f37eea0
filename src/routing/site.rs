//! Site route table
//!
//! The fixed set of pages served by the portal.

use super::action::Action;
use super::router::Router;
use crate::error::RouteError;
use hyper::Method;

/// Chat automation webhook the `/s1q` page hands visitors off to
pub const CHAT_WEBHOOK_URL: &str =
    "https://niraj-12879.app.n8n.cloud/webhook/4a410a85-84c3-4875-8718-6a45ac59b10e/chat";

/// Literal page routes: (path, template)
const PAGES: &[(&str, &str)] = &[
    ("/", "index"),
    ("/quiz", "quiz"),
    ("/course", "course"),
    ("/college", "college"),
    ("/timeline", "timeline"),
    ("/aboutus", "aboutus"),
    ("/ctc", "ctc"),
    ("/contact", "contact"),
    ("/successtory", "success"),
];

/// Build the site's route table
pub fn site_router() -> Result<Router, RouteError> {
    let mut builder = Router::builder();

    for (path, template) in PAGES {
        builder.register(path, &[Method::GET], Action::render(template))?;
    }

    // Login has no form handling; POST renders the same page
    builder.register(
        "/login",
        &[Method::GET, Method::POST],
        Action::render("login"),
    )?;
    builder.register("/s1q", &[Method::GET], Action::redirect(CHAT_WEBHOOK_URL))?;
    builder.register("/<usr>", &[Method::GET], Action::echo("usr"))?;

    Ok(builder.build())
}
