//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, apply env overrides)
//!     → validation.rs (semantic checks)
//!     → BffConfig (validated, immutable)
//!     → consumed once at startup by every subsystem
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; rules and channels are built from it at startup
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::BffConfig;
pub use schema::{
    ListenerConfig, LogFormat, ObservabilityConfig, RoutingConfig, SessionConfig, StreamConfig,
    UpstreamConfig, UpstreamsConfig,
};
