//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::BffConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Sets `session.secure`; only the literal `true` enables it.
pub const ENV_COOKIE_SECURE: &str = "COOKIE_SECURE";

/// Replaces `stream.backend_url`.
pub const ENV_HTTP_CHAT_URL: &str = "HTTP_CHAT_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BffConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: BffConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the default configuration with environment overrides applied.
pub fn default_config() -> Result<BffConfig, ConfigError> {
    let mut config = BffConfig::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut BffConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(secure) = lookup(ENV_COOKIE_SECURE) {
        config.session.secure = secure.trim() == "true";
    }

    if let Some(url) = lookup(ENV_HTTP_CHAT_URL).filter(|u| !u.trim().is_empty()) {
        config.stream.backend_url = url.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_COOKIE_SECURE, "true"),
            (ENV_HTTP_CHAT_URL, "http://chat:8080"),
        ]
        .into_iter()
        .collect();

        let mut config = BffConfig::default();
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert!(config.session.secure);
        assert_eq!(config.stream.backend_url, "http://chat:8080");
    }

    #[test]
    fn test_cookie_secure_only_on_literal_true() {
        let mut config = BffConfig::default();
        config.session.secure = true;
        apply_env_overrides(&mut config, |key| {
            (key == ENV_COOKIE_SECURE).then(|| "yes".to_string())
        });
        assert!(!config.session.secure);
    }

    #[test]
    fn test_load_config_reports_validation_errors() {
        let dir = std::env::temp_dir().join(format!("trip-bff-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bff.toml");
        fs::write(&path, "[routing]\napi_prefix = \"api\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("api_prefix must start with '/'"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/trip-bff.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
