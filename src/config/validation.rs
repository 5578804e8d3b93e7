//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and URLs before anything binds or connects
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BffConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{BffConfig, UpstreamConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid socket address for {field}: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("api_prefix must start with '/': {0}")]
    InvalidPrefix(String),

    #[error("session cookie name cannot be empty")]
    EmptyCookieName,

    #[error("no_auth path {path} is outside api_prefix {prefix}")]
    PathOutsidePrefix { path: String, prefix: String },

    #[error("stream.path must be a literal path below '/': {0}")]
    InvalidStreamPath(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &BffConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "timeouts.request_secs" });
    }

    let prefix = &config.routing.api_prefix;
    if !prefix.starts_with('/') {
        errors.push(ValidationError::InvalidPrefix(prefix.clone()));
    }
    for path in &config.routing.no_auth_paths {
        if !path.starts_with(prefix.as_str()) {
            errors.push(ValidationError::PathOutsidePrefix {
                path: path.clone(),
                prefix: prefix.clone(),
            });
        }
    }

    if config.session.cookie_name.trim().is_empty() {
        errors.push(ValidationError::EmptyCookieName);
    }

    validate_upstream(&config.upstreams.user, "upstreams.user", &mut errors);
    validate_upstream(&config.upstreams.attraction, "upstreams.attraction", &mut errors);

    if !is_http_url(&config.stream.backend_url) {
        errors.push(ValidationError::InvalidUrl {
            field: "stream.backend_url",
            value: config.stream.backend_url.clone(),
        });
    }

    let stream_path = &config.stream.path;
    if !stream_path.starts_with('/')
        || stream_path == "/"
        || stream_path.contains(['{', '}', '*'])
    {
        errors.push(ValidationError::InvalidStreamPath(stream_path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_upstream(
    upstream: &UpstreamConfig,
    field: &'static str,
    errors: &mut Vec<ValidationError>,
) {
    if !is_http_url(&upstream.endpoint) {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: upstream.endpoint.clone(),
        });
    }
    if upstream.connect_timeout_secs == 0 || upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field });
    }
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}
