//! Template store
//!
//! Resolves a template name to `<dir>/<name>.html` and renders it against a
//! context. `site.templates_dir` must point at the site's page files; no pages
//! ship with the server.
//!
//! Template dialect:
//! - `{{ name }}` is replaced by the HTML-escaped context value, or nothing
//!   when `name` is undefined.
//! - `{{ url_for('static', filename='js/chat.js') }}` becomes the asset URL
//!   under the static prefix (`/static/js/chat.js`).
//! - Any other `{{ ... }}` expression, including `url_for` for non-static
//!   endpoints, is passed through untouched. There are no blocks, filters or
//!   inheritance.

use crate::error::TemplateError;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// Template variables, keyed by placeholder name
pub type Context = BTreeMap<String, String>;

const TEMPLATE_EXTENSION: &str = "html";
const DEFAULT_STATIC_PREFIX: &str = "/static";

/// Directory-backed template store
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
    static_prefix: String,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            static_prefix: DEFAULT_STATIC_PREFIX.to_string(),
        }
    }

    /// URL prefix `url_for('static', ...)` resolves under
    #[must_use]
    pub fn with_static_prefix(mut self, prefix: &str) -> Self {
        self.static_prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    /// Render the named template with the given context
    pub async fn render(&self, name: &str, context: &Context) -> Result<String, TemplateError> {
        let path = self
            .resolve(name)
            .ok_or_else(|| TemplateError::Missing(name.to_string()))?;

        let source = match fs::read_to_string(&path).await {
            Ok(source) => source,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TemplateError::Missing(name.to_string()));
            }
            Err(source) => {
                return Err(TemplateError::Io {
                    name: name.to_string(),
                    source,
                });
            }
        };

        Ok(substitute(&source, context, &self.static_prefix))
    }

    /// Map a template name to its file, rejecting anything that could leave `dir`
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return None;
        }
        Some(self.dir.join(format!("{name}.{TEMPLATE_EXTENSION}")))
    }
}

/// Replace `{{ key }}` placeholders with escaped context values
fn substitute(source: &str, context: &Context, static_prefix: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(open) = rest.find("{{") {
        let Some(len) = rest[open + 2..].find("}}") else {
            break;
        };
        let close = open + 2 + len;
        let key = rest[open + 2..close].trim();

        out.push_str(&rest[..open]);
        if is_identifier(key) {
            // Undefined variables render as empty
            if let Some(value) = context.get(key) {
                out.push_str(&escape_html(value));
            }
        } else if let Some(filename) = static_filename(key) {
            let url = format!("{static_prefix}/{}", filename.trim_start_matches('/'));
            out.push_str(&escape_html(&url));
        } else {
            out.push_str(&rest[open..close + 2]);
        }
        rest = &rest[close + 2..];
    }

    out.push_str(rest);
    out
}

/// Filename from `url_for('static', filename='...')`, either quote style
fn static_filename(expr: &str) -> Option<&str> {
    let args = expr
        .strip_prefix("url_for")?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?;
    let (endpoint, filename) = args.split_once(',')?;
    if unquote(endpoint.trim())? != "static" {
        return None;
    }
    let (param, value) = filename.split_once('=')?;
    if param.trim() != "filename" {
        return None;
    }
    unquote(value.trim())
}

fn unquote(s: &str) -> Option<&str> {
    s.strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .or_else(|| s.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escape text for safe inclusion in HTML element content or attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
