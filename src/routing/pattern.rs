//! Route pattern parsing and matching
//!
//! Two pattern shapes exist: an exact literal path (`/quiz`) and a single
//! named segment placeholder (`/<usr>`) that captures one path segment.

use crate::error::RouteError;
use std::fmt;

/// Parsed route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    /// Exact path match
    Literal(String),
    /// One named segment, e.g. `/<usr>`
    Param(String),
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let invalid = |reason| RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(invalid("pattern must start with '/'"));
        };

        if !pattern.contains(['<', '>']) {
            return Ok(Self::Literal(pattern.to_string()));
        }

        let name = rest
            .strip_prefix('<')
            .and_then(|r| r.strip_suffix('>'))
            .ok_or_else(|| invalid("placeholder must be the whole single segment"))?;

        if name.is_empty() {
            return Err(invalid("placeholder name is empty"));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid("placeholder name must be alphanumeric"));
        }

        Ok(Self::Param(name.to_string()))
    }

    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Match a literal pattern against an exact path
    pub fn matches_literal(&self, path: &str) -> bool {
        matches!(self, Self::Literal(literal) if literal == path)
    }

    /// Capture the single segment of `path` for a placeholder pattern
    ///
    /// Returns `None` for literal patterns, the root path, and paths with
    /// more than one segment.
    pub fn capture<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.is_literal() {
            return None;
        }
        let segment = path.strip_prefix('/')?;
        if segment.is_empty() || segment.contains('/') {
            return None;
        }
        Some(segment)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(path) => f.write_str(path),
            Self::Param(name) => write!(f, "/<{name}>"),
        }
    }
}

/// Percent-decode a request path
///
/// Invalid escapes are kept verbatim and invalid UTF-8 is replaced, matching
/// how browsers expect a lenient server to behave.
pub fn decode_path(path: &str) -> String {
    if !path.contains('%') {
        return path.to_string();
    }
    String::from_utf8_lossy(&urlencoding::decode_binary(path.as_bytes())).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal() {
        assert_eq!(
            RoutePattern::parse("/quiz").unwrap(),
            RoutePattern::Literal("/quiz".to_string())
        );
        assert_eq!(
            RoutePattern::parse("/").unwrap(),
            RoutePattern::Literal("/".to_string())
        );
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(
            RoutePattern::parse("/<usr>").unwrap(),
            RoutePattern::Param("usr".to_string())
        );
        assert_eq!(RoutePattern::parse("/<usr>").unwrap().to_string(), "/<usr>");
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["quiz", "/<>", "/a/<usr>", "/<usr>/x", "/<u-s>", "/<usr"] {
            assert!(
                matches!(
                    RoutePattern::parse(bad),
                    Err(RouteError::InvalidPattern { .. })
                ),
                "pattern should be rejected: {bad}"
            );
        }
    }

    #[test]
    fn test_capture_single_segment() {
        let pattern = RoutePattern::Param("usr".to_string());
        assert_eq!(pattern.capture("/alice"), Some("alice"));
        assert_eq!(pattern.capture("/a/b"), None);
        assert_eq!(pattern.capture("/"), None);
        assert_eq!(pattern.capture("/alice/"), None);
        assert_eq!(RoutePattern::Literal("/quiz".to_string()).capture("/quiz"), None);
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/hello%20world"), "/hello world");
        assert_eq!(decode_path("/qu%69z"), "/quiz");
        assert_eq!(decode_path("/a%2Fb"), "/a/b");
        assert_eq!(decode_path("/100%"), "/100%");
        assert_eq!(decode_path("/bad%zz"), "/bad%zz");
        assert_eq!(decode_path("/caf%C3%A9"), "/café");
        assert_eq!(decode_path("/%41"), "/A");
        assert_eq!(decode_path("/a%2"), "/a%2");
        assert_eq!(decode_path("/%"), "/%");
    }
}
