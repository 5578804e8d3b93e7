//! Per-request gRPC metadata.
//!
//! # Responsibilities
//! - Skip auth entirely for allow-listed paths
//! - Turn the session cookie into `authorization: Bearer <token>`
//! - Resolve `uid` and `roles` through the user service
//!
//! # Design Decisions
//! - Never fails: identity problems degrade to a bearer-only map
//! - One identity lookup per request, no caching
//! - The target service stays responsible for rejecting bad tokens

use std::collections::HashSet;

use axum::http::HeaderMap;
use tonic::metadata::{AsciiMetadataValue, MetadataMap};
use tonic::Request;

use crate::config::RoutingConfig;
use crate::observability::metrics;
use crate::rpc::client::UserRpc;
use crate::rpc::proto::user::{GetCurrentUserRequest, User};
use crate::security::session::SessionCookie;

pub const AUTHORIZATION: &str = "authorization";
pub const UID: &str = "uid";
pub const ROLES: &str = "roles";

/// Builds the metadata attached to every proxied call.
#[derive(Debug, Clone)]
pub struct MetadataBuilder {
    no_auth_paths: HashSet<String>,
    session: SessionCookie,
}

impl MetadataBuilder {
    pub fn new(routing: &RoutingConfig, session: SessionCookie) -> Self {
        Self {
            no_auth_paths: routing.no_auth_paths.iter().cloned().collect(),
            session,
        }
    }

    /// Build metadata for a request to `path`.
    pub async fn build(
        &self,
        path: &str,
        headers: &HeaderMap,
        identity: &dyn UserRpc,
    ) -> MetadataMap {
        if self.no_auth_paths.contains(path) {
            return MetadataMap::new();
        }

        let Some(token) = self.session.token(headers) else {
            return MetadataMap::new();
        };

        let Some(bearer) = bearer_value(&token) else {
            tracing::warn!(
                path = %path,
                "Session token is not a valid metadata value, dropping it"
            );
            return MetadataMap::new();
        };

        // 1. Temporary metadata carrying only the credential
        let mut auth_metadata = MetadataMap::new();
        auth_metadata.insert(AUTHORIZATION, bearer.clone());

        let mut request = Request::new(GetCurrentUserRequest {});
        *request.metadata_mut() = auth_metadata;

        // 2. Resolve the identity behind it
        let user = match identity.get_current_user(request).await {
            Ok(response) => response.into_inner().user,
            Err(status) => {
                tracing::debug!(
                    path = %path,
                    code = ?status.code(),
                    "Identity resolution failed, forwarding bearer token only"
                );
                metrics::record_identity_lookup("failed");
                return bearer_only(bearer);
            }
        };

        // 3. Final metadata
        let Some(user) = user else {
            metrics::record_identity_lookup("anonymous");
            return bearer_only(bearer);
        };

        match identity_metadata(&user, bearer.clone()) {
            Some(metadata) => {
                metrics::record_identity_lookup("resolved");
                metadata
            }
            None => {
                tracing::warn!(path = %path, "Identity claims are not valid metadata values");
                metrics::record_identity_lookup("failed");
                bearer_only(bearer)
            }
        }
    }
}

fn bearer_value(token: &str) -> Option<AsciiMetadataValue> {
    format!("Bearer {token}").parse().ok()
}

fn bearer_only(bearer: AsciiMetadataValue) -> MetadataMap {
    let mut metadata = MetadataMap::new();
    metadata.insert(AUTHORIZATION, bearer);
    metadata
}

fn identity_metadata(user: &User, bearer: AsciiMetadataValue) -> Option<MetadataMap> {
    let uid: AsciiMetadataValue = user.id.parse().ok()?;
    let roles: AsciiMetadataValue = serde_json::to_string(&user.roles).ok()?.parse().ok()?;

    let mut metadata = MetadataMap::new();
    metadata.insert(UID, uid);
    metadata.insert(ROLES, roles);
    metadata.insert(AUTHORIZATION, bearer);
    Some(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::rpc::proto::user::{
        ChangePasswordRequest, ChangePasswordResponse, GetCurrentUserResponse, LoginRequest,
        LoginResponse, RegisterRequest, RegisterResponse,
    };
    use async_trait::async_trait;
    use axum::http::{header, HeaderValue};
    use std::sync::Mutex;
    use tonic::{Response, Status};

    /// Identity service returning a canned result and recording what it saw.
    struct FakeIdentity {
        result: Result<Option<User>, Status>,
        seen: Mutex<Vec<MetadataMap>>,
    }

    impl FakeIdentity {
        fn new(result: Result<Option<User>, Status>) -> Self {
            Self { result, seen: Mutex::new(Vec::new()) }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl UserRpc for FakeIdentity {
        async fn register(
            &self,
            _: Request<RegisterRequest>,
        ) -> Result<Response<RegisterResponse>, Status> {
            Err(Status::unimplemented("register"))
        }

        async fn login(&self, _: Request<LoginRequest>) -> Result<Response<LoginResponse>, Status> {
            Err(Status::unimplemented("login"))
        }

        async fn get_current_user(
            &self,
            request: Request<GetCurrentUserRequest>,
        ) -> Result<Response<GetCurrentUserResponse>, Status> {
            self.seen.lock().unwrap().push(request.metadata().clone());
            self.result
                .clone()
                .map(|user| Response::new(GetCurrentUserResponse { user }))
        }

        async fn change_password(
            &self,
            _: Request<ChangePasswordRequest>,
        ) -> Result<Response<ChangePasswordResponse>, Status> {
            Err(Status::unimplemented("change_password"))
        }
    }

    fn builder(no_auth: &[&str]) -> MetadataBuilder {
        let routing = RoutingConfig {
            no_auth_paths: no_auth.iter().map(|p| p.to_string()).collect(),
            ..RoutingConfig::default()
        };
        MetadataBuilder::new(&routing, SessionCookie::new(&SessionConfig::default()))
    }

    fn with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("token={token}")).unwrap(),
        );
        headers
    }

    fn get<'a>(metadata: &'a MetadataMap, key: &str) -> Option<&'a str> {
        metadata.get(key).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_no_token_means_empty_metadata() {
        let identity = FakeIdentity::new(Ok(None));
        let metadata = builder(&[])
            .build("/api/user/get-current-user", &HeaderMap::new(), &identity)
            .await;

        assert!(metadata.is_empty());
        assert_eq!(identity.calls(), 0);
    }

    #[tokio::test]
    async fn test_allow_listed_path_skips_identity() {
        let identity = FakeIdentity::new(Ok(None));
        let metadata = builder(&["/api/user/login"])
            .build("/api/user/login", &with_token("abc"), &identity)
            .await;

        assert!(metadata.is_empty());
        assert_eq!(identity.calls(), 0);
    }

    #[tokio::test]
    async fn test_resolved_identity() {
        let identity = FakeIdentity::new(Ok(Some(User {
            id: "u1".into(),
            username: "alice".into(),
            roles: vec!["admin".into()],
        })));
        let metadata = builder(&[])
            .build("/api/v1/attractions/nearby", &with_token("abc"), &identity)
            .await;

        assert_eq!(get(&metadata, UID), Some("u1"));
        assert!(get(&metadata, ROLES).unwrap().contains("\"admin\""));
        assert_eq!(get(&metadata, AUTHORIZATION), Some("Bearer abc"));

        // The identity call itself only carried the credential.
        let seen = identity.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(get(&seen[0], AUTHORIZATION), Some("Bearer abc"));
        assert!(seen[0].get(UID).is_none());
    }

    #[tokio::test]
    async fn test_identity_failure_keeps_bearer() {
        let identity = FakeIdentity::new(Err(Status::unauthenticated("expired")));
        let metadata = builder(&[])
            .build("/api/user/change-password", &with_token("abc"), &identity)
            .await;

        assert_eq!(get(&metadata, AUTHORIZATION), Some("Bearer abc"));
        assert!(metadata.get(UID).is_none());
        assert!(metadata.get(ROLES).is_none());
    }

    #[tokio::test]
    async fn test_identity_without_user_keeps_bearer() {
        let identity = FakeIdentity::new(Ok(None));
        let metadata = builder(&[])
            .build("/api/user/change-password", &with_token("abc"), &identity)
            .await;

        assert_eq!(get(&metadata, AUTHORIZATION), Some("Bearer abc"));
        assert!(metadata.get(UID).is_none());
    }
}
