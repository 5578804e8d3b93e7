//! Session cookie handling.
//!
//! # Responsibilities
//! - Read the bearer token from the inbound `Cookie` header
//! - Issue the session cookie after a successful login
//! - Clear the session cookie on logout
//!
//! # Design Decisions
//! - Cookies are always `HttpOnly`, `SameSite=Lax`
//! - `Secure` follows configuration (only behind TLS)
//! - Malformed cookie pairs are skipped, not rejected

use axum::http::{header, HeaderMap, HeaderValue};
use cookie::{Cookie, SameSite};

use crate::config::SessionConfig;

/// Reads and writes the session cookie.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    max_age_secs: i64,
    secure: bool,
    path: String,
}

impl SessionCookie {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            max_age_secs: config.max_age_secs,
            secure: config.secure,
            path: config.path.clone(),
        }
    }

    /// Extract the session token from request headers.
    ///
    /// Empty values count as absent.
    pub fn token(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|raw| Cookie::split_parse_encoded(raw.to_string()))
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == self.name)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    }

    /// `Set-Cookie` value carrying a fresh session token.
    pub fn issue(&self, token: &str) -> Option<HeaderValue> {
        self.build(token.to_string(), self.max_age_secs)
    }

    /// `Set-Cookie` value that expires the session immediately.
    pub fn clear(&self) -> Option<HeaderValue> {
        self.build(String::new(), 0)
    }

    fn build(&self, value: String, max_age_secs: i64) -> Option<HeaderValue> {
        let cookie = Cookie::build((self.name.clone(), value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(max_age_secs))
            .path(self.path.clone())
            .build();

        match HeaderValue::from_str(&cookie.encoded().to_string()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    cookie = %self.name,
                    error = %e,
                    "Session cookie is not a valid header value"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(secure: bool) -> SessionCookie {
        SessionCookie::new(&SessionConfig {
            secure,
            ..SessionConfig::default()
        })
    }

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_token_from_cookie_header() {
        let session = session(false);
        assert_eq!(
            session.token(&headers("theme=dark; token=abc.def; lang=en")),
            Some("abc.def".to_string())
        );
        assert_eq!(session.token(&headers("theme=dark")), None);
        assert_eq!(session.token(&headers("token=")), None);
        assert_eq!(session.token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_token_is_percent_decoded() {
        let session = session(false);
        assert_eq!(
            session.token(&headers("token=a%20b")),
            Some("a b".to_string())
        );
    }

    #[test]
    fn test_issue_sets_attributes() {
        let value = session(false).issue("abc").unwrap();
        let cookie = Cookie::parse(value.to_str().unwrap().to_string()).unwrap();

        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604_800)));
        assert_eq!(cookie.path(), Some("/"));
        assert_ne!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_clear_expires_immediately() {
        let value = session(true).clear().unwrap();
        let cookie = Cookie::parse(value.to_str().unwrap().to_string()).unwrap();

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.secure(), Some(true));
    }
}
