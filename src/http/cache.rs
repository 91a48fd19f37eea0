//! Cache validators for static assets

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate a strong `ETag` from content
///
/// Returns a quoted tag, e.g. `"abc123def"`.
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Check a client's `If-None-Match` header against the server `ETag`
///
/// Accepts lists (`"a", "b"`), the `*` wildcard, and weak tags (`W/"a"`),
/// which compare weakly as RFC 9110 requires for `If-None-Match`.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|header| {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.trim_start_matches("W/") == etag
        })
    })
}
