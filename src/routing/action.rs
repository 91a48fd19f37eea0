//! Route actions
//!
//! What a matched route does: render a template, redirect, or echo the
//! captured path segment back as HTML.

use crate::error::DispatchError;
use crate::http;
use crate::templates::{escape_html, Context, TemplateStore};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Render a named template with a context
    RenderTemplate { name: String, context: Context },
    /// 302 redirect to an absolute URL
    Redirect { target: String },
    /// Echo the captured segment as `<h1>{value}</h1>`
    EchoParam { param: String },
}

impl Action {
    /// Render a template with an empty context
    pub fn render(name: &str) -> Self {
        Self::RenderTemplate {
            name: name.to_string(),
            context: Context::new(),
        }
    }

    pub fn redirect(target: &str) -> Self {
        Self::Redirect {
            target: target.to_string(),
        }
    }

    pub fn echo(param: &str) -> Self {
        Self::EchoParam {
            param: param.to_string(),
        }
    }

    /// Produce the response for this action
    ///
    /// `captured` is the path segment bound by a placeholder pattern, if any.
    pub async fn execute(
        &self,
        captured: Option<&str>,
        templates: &TemplateStore,
    ) -> Result<Response<Full<Bytes>>, DispatchError> {
        match self {
            Self::RenderTemplate { name, context } => {
                let html = templates.render(name, context).await?;
                Ok(http::build_html_response(html))
            }
            Self::Redirect { target } => Ok(http::build_redirect_response(target)),
            Self::EchoParam { .. } => {
                let value = escape_html(captured.unwrap_or_default());
                Ok(http::build_html_response(format!("<h1>{value}</h1>")))
            }
        }
    }
}
