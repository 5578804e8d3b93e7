//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind server to listener with graceful shutdown
//! - Dispatch API requests to proxy rules
//! - Serve logout and the event-stream passthrough
//! - Observability (metrics, correlation IDs)

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Method, Request},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::BffConfig;
use crate::http::request::{
    carries_body, propagate_request_id_layer, read_payload, request_id, set_request_id_layer,
};
use crate::http::response::{envelope_rejections, not_found, Envelope};
use crate::http::stream::{StreamError, StreamProxy};
use crate::observability::metrics;
use crate::routing::{default_registry, Dispatch, PathPrefixMatcher, RuleRegistry};
use crate::rpc::{MetadataBuilder, Upstreams};
use crate::security::session::SessionCookie;

/// Logout endpoints; both spellings are served.
pub const LOGOUT_PATHS: [&str; 2] = ["/api/user/logout", "/api/v1/users/logout"];

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RuleRegistry>,
    pub upstreams: Upstreams,
    pub metadata: Arc<MetadataBuilder>,
    pub session: SessionCookie,
    pub api_prefix: PathPrefixMatcher,
    pub stream: StreamProxy,
    pub max_body_size: usize,
}

/// HTTP front of the BFF.
pub struct BffServer {
    router: Router,
}

impl BffServer {
    /// Create a new server over the given upstream clients.
    pub fn new(config: BffConfig, upstreams: Upstreams) -> Result<Self, StreamError> {
        let session = SessionCookie::new(&config.session);
        let registry = Arc::new(default_registry(session.clone()));
        let metadata = Arc::new(MetadataBuilder::new(&config.routing, session.clone()));
        let stream = StreamProxy::new(&config.stream)?;

        tracing::info!(
            rules = registry.len(),
            api_prefix = %config.routing.api_prefix,
            stream_target = %stream.target(),
            "Proxy rules registered"
        );

        let state = AppState {
            registry,
            upstreams,
            metadata,
            session,
            api_prefix: PathPrefixMatcher::new(config.routing.api_prefix.clone()),
            stream,
            max_body_size: config.limits.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The stream route is exempt from the request timeout. Timeout and
    /// body-limit rejections are rewritten into envelopes.
    #[allow(deprecated)]
    fn build_router(config: &BffConfig, state: AppState) -> Router {
        let proxied = Router::new()
            .route(LOGOUT_PATHS[0], any(logout_handler))
            .route(LOGOUT_PATHS[1], any(logout_handler))
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .route(&config.stream.path, any(stream_handler))
            .merge(proxied)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(middleware::map_response(envelope_rejections))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Looks up the rule, builds metadata and forwards to the RPC.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        client = %client,
        method = %method,
        path = %path,
        "Proxying request"
    );

    // 1. API prefix
    if !state.api_prefix.matches(&path) {
        tracing::debug!(request_id = %request_id, path = %path, "Outside API prefix");
        metrics::record_request(method.as_str(), 404, "none", start_time);
        return not_found();
    }

    // 2. Match Rule
    let Some(rule) = state.registry.lookup(&method, &path) else {
        tracing::warn!(request_id = %request_id, method = %method, path = %path, "No rule matched");
        metrics::record_request(method.as_str(), 404, "none", start_time);
        return not_found();
    };

    // 3. Parse Body
    let (parts, body) = request.into_parts();
    let payload = if carries_body(&parts.method) {
        read_payload(&parts.headers, body, state.max_body_size).await
    } else {
        None
    };

    // 4. Build Metadata
    let metadata = state
        .metadata
        .build(&path, &parts.headers, state.upstreams.user.as_ref())
        .await;

    // 5. Invoke
    let response = rule
        .dispatch(Dispatch {
            upstreams: &state.upstreams,
            request: &parts,
            payload,
            metadata,
        })
        .await;

    let status = response.status();
    tracing::info!(
        request_id = %request_id,
        rule = rule.name(),
        rpc = rule.rpc(),
        status = status.as_u16(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Request proxied"
    );
    metrics::record_request(method.as_str(), status.as_u16(), rule.name(), start_time);

    response
}

/// Clears the session cookie. Succeeds whether or not a session existed.
async fn logout_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();

    if method != Method::POST {
        metrics::record_request(method.as_str(), 404, "none", start_time);
        return not_found();
    }

    let mut response = Envelope::success_with_msg(json!({}), "Logout successful").into_response();
    if let Some(cookie) = state.session.clear() {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }

    tracing::debug!(request_id = %request_id(request.headers()), "Session cleared");
    metrics::record_request(method.as_str(), 200, "user.logout", start_time);
    response
}

/// Relays a chat event stream.
async fn stream_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();

    if method != Method::POST {
        metrics::record_request(method.as_str(), 404, "none", start_time);
        return not_found();
    }

    let (parts, body) = request.into_parts();
    tracing::debug!(request_id = %request_id(&parts.headers), "Opening event stream");

    let response = state.stream.forward(&parts.headers, body).await;
    metrics::record_request(method.as_str(), response.status().as_u16(), "stream", start_time);
    response
}
