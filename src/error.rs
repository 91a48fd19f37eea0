//! Error types
//!
//! Startup errors (route registration) are kept apart from per-request
//! dispatch errors so that a bad route table can never surface at request time.

use hyper::{Method, StatusCode};
use thiserror::Error;

/// Route table construction errors, raised only while the table is built
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("route conflict: pattern '{0}' is already registered")]
    Conflict(String),
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },
    #[error("route '{0}' accepts no methods")]
    NoMethods(String),
}

/// Template store errors
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template '{0}' not found")]
    Missing(String),
    #[error("failed to read template '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Per-request dispatch errors
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no route matches the request path")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed { allowed: Vec<Method> },
    #[error("template '{0}' is missing from the template store")]
    TemplateMissing(String),
    #[error(transparent)]
    Template(TemplateError),
}

impl DispatchError {
    /// HTTP status the error is surfaced as
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::TemplateMissing(_) | Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Server-side faults are logged as errors; client faults are not
    pub const fn is_server_fault(&self) -> bool {
        matches!(self, Self::TemplateMissing(_) | Self::Template(_))
    }
}

impl From<TemplateError> for DispatchError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::Missing(name) => Self::TemplateMissing(name),
            other => Self::Template(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(DispatchError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            DispatchError::MethodNotAllowed { allowed: vec![Method::GET] }.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            DispatchError::TemplateMissing("quiz".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_template_converts_to_template_missing() {
        let err: DispatchError = TemplateError::Missing("ctc".to_string()).into();
        assert!(matches!(err, DispatchError::TemplateMissing(ref name) if name == "ctc"));
        assert!(err.is_server_fault());
        assert!(!DispatchError::NotFound.is_server_fault());
    }
}
