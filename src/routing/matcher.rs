//! Route matching logic.
//!
//! # Responsibilities
//! - Match the HTTP method (exact, case-sensitive) when one is set
//! - Match the percent-decoded request path against a glob pattern
//! - Combine both conditions with AND semantics
//!
//! # Design Decisions
//! - No method = any method
//! - The canonical match-all pattern skips the path matcher entirely
//! - Malformed escapes are left for the evaluator to reject; here they fall
//!   back to the raw path

use std::borrow::Cow;

use axum::http::{request::Parts, Method};

use crate::pattern::{canonicalize, decode_path, match_path, MATCH_ALL};

/// Method + path-pattern condition on a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatcher {
    method: Option<Method>,
    pattern: String,
}

impl RouteMatcher {
    /// Matches `pattern` for any method. `**` is shorthand for `/**`.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            method: None,
            pattern: canonicalize(pattern),
        }
    }

    /// Matches `pattern` only for `method`.
    pub fn with_method(method: Method, pattern: impl Into<String>) -> Self {
        Self {
            method: Some(method),
            pattern: canonicalize(pattern),
        }
    }

    /// Matcher for every request.
    pub fn any() -> Self {
        Self::new(MATCH_ALL)
    }

    /// Required method, if any.
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// Canonical pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true if the request head matches this condition.
    pub fn matches(&self, req: &Parts) -> bool {
        let raw = req.uri.path();
        let path = decode_path(raw).unwrap_or(Cow::Borrowed(raw));
        self.matches_route(&req.method, &path)
    }

    /// Matches an already decoded path.
    pub fn matches_route(&self, method: &Method, path: &str) -> bool {
        if self.method.as_ref().is_some_and(|m| m != method) {
            return false;
        }

        if self.pattern == MATCH_ALL {
            return true;
        }

        match_path(&self.pattern, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(method: Method, uri: &str) -> Parts {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn test_pattern_only() {
        let matcher = RouteMatcher::new("/api/*/users");

        assert!(matcher.matches(&parts(Method::GET, "http://example.com/api/v1/users")));
        assert!(matcher.matches(&parts(Method::DELETE, "/api/v2/users?page=2")));
        assert!(!matcher.matches(&parts(Method::GET, "/api/v1/groups")));
    }

    #[test]
    fn test_encoded_path_is_decoded() {
        let matcher = RouteMatcher::new("/admin/**");

        assert!(matcher.matches(&parts(Method::GET, "/%61dmin/users")));
        assert!(matcher.matches(&parts(Method::GET, "/admin%2Fusers")));
        assert!(!matcher.matches(&parts(Method::GET, "/%62dmin/users")));
    }

    #[test]
    fn test_method_constraint() {
        let matcher = RouteMatcher::with_method(Method::POST, "/orders/**");

        assert!(matcher.matches(&parts(Method::POST, "/orders/42")));
        assert!(!matcher.matches(&parts(Method::GET, "/orders/42")));
        assert_eq!(matcher.method(), Some(&Method::POST));
    }

    #[test]
    fn test_method_is_case_sensitive() {
        let lower = Method::from_bytes(b"post").unwrap();
        let matcher = RouteMatcher::with_method(lower, "/orders");

        assert!(!matcher.matches_route(&Method::POST, "/orders"));
    }

    #[test]
    fn test_match_all_shorthand() {
        let matcher = RouteMatcher::new("**");
        assert_eq!(matcher.pattern(), MATCH_ALL);
        assert_eq!(matcher, RouteMatcher::any());

        assert!(matcher.matches_route(&Method::GET, "/"));
        assert!(matcher.matches_route(&Method::PUT, "/deeply/nested/path/"));
    }
}
