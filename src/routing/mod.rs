//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → matcher.rs (API prefix gate, route keys)
//!     → registry.rs (exact key, then path-only key)
//!     → Return: matched Rule or NoMatch
//!
//! Rule Registration (at startup):
//!     default_registry(session)
//!     → RouteKey → Rule (closed enum of rule structs)
//!     → Freeze as immutable RuleRegistry
//! ```
//!
//! # Design Decisions
//! - Rules registered at startup, immutable at runtime
//! - No regex in hot path (exact keys only)
//! - Deterministic: same input always matches same rule

pub mod matcher;
pub mod registry;
pub mod rules;

pub use matcher::{PathPrefixMatcher, RouteKey};
pub use registry::{default_registry, RuleRegistry};
pub use rules::{Dispatch, ProxyRule, Rule};
