//! Rule lookup.
//!
//! # Responsibilities
//! - Store proxy rules under their route keys
//! - Resolve `(method, path)` to a rule or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Two-tier lookup: exact `"<METHOD> <path>"` first, then path alone
//! - O(1) lookups via HashMap

use std::collections::HashMap;

use axum::http::Method;

use crate::routing::matcher::RouteKey;
use crate::routing::rules::{
    ChangePasswordRule, FindAttractionByIdRule, GetCurrentUserRule, LoginRule,
    NearbyAttractionsRule, RegisterRule, Rule,
};
use crate::security::session::SessionCookie;

/// Read-only table of proxy rules.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<RouteKey, Rule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. A later registration under the same key replaces the earlier one.
    pub fn register(mut self, key: RouteKey, rule: Rule) -> Self {
        if let Some(previous) = self.rules.insert(key.clone(), rule) {
            tracing::warn!(key = %key, replaced = previous.name(), "Proxy rule registered twice");
        }
        self
    }

    /// Find the rule serving `method` on `path`.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&Rule> {
        RouteKey::candidates(method, path)
            .iter()
            .find_map(|key| self.rules.get(key))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The BFF's built-in rules.
pub fn default_registry(session: SessionCookie) -> RuleRegistry {
    RuleRegistry::new()
        .register(
            RouteKey::exact("POST", "/api/user/register"),
            Rule::Register(RegisterRule),
        )
        .register(
            RouteKey::exact("POST", "/api/user/login"),
            Rule::Login(LoginRule::new(session)),
        )
        .register(
            RouteKey::exact("POST", "/api/user/get-current-user"),
            Rule::GetCurrentUser(GetCurrentUserRule),
        )
        .register(
            RouteKey::exact("POST", "/api/user/change-password"),
            Rule::ChangePassword(ChangePasswordRule),
        )
        .register(
            RouteKey::exact("POST", "/api/v1/attractions/find-by-id"),
            Rule::FindAttractionById(FindAttractionByIdRule),
        )
        .register(
            RouteKey::exact("POST", "/api/v1/attractions/nearby"),
            Rule::NearbyAttractions(NearbyAttractionsRule),
        )
}
