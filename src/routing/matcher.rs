//! Route matching logic.
//!
//! # Responsibilities
//! - Gate the rule space behind the API prefix
//! - Normalize `(method, path)` into registry keys
//!
//! # Design Decisions
//! - Path matching is case-sensitive, method matching is not
//! - Prefixes match on segment boundaries (`/api` does not match `/apiary`)
//! - No regex to guarantee O(n) matching

use std::fmt;

use axum::http::Method;

/// Matches paths under a fixed prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher. A trailing `/` is ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        Self {
            prefix: trimmed.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if `path` lies under the prefix.
    pub fn matches(&self, path: &str) -> bool {
        if self.prefix.is_empty() {
            return path.starts_with('/');
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Key a proxy rule is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteKey {
    /// `"<METHOD> <path>"`, method uppercased.
    Exact { method: String, path: String },
    /// Path alone; serves any method with no exact entry.
    Path(String),
}

impl RouteKey {
    pub fn exact(method: &str, path: impl Into<String>) -> Self {
        RouteKey::Exact {
            method: method.to_ascii_uppercase(),
            path: path.into(),
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        RouteKey::Path(path.into())
    }

    /// Keys tried for an inbound request, in lookup order.
    pub fn candidates(method: &Method, path: &str) -> [RouteKey; 2] {
        [RouteKey::exact(method.as_str(), path), RouteKey::path(path)]
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKey::Exact { method, path } => write!(f, "{method} {path}"),
            RouteKey::Path(path) => f.write_str(path),
        }
    }
}
