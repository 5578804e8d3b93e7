//! Server-sent events passthrough to the chat backend.
//!
//! # Responsibilities
//! - Forward the client's body and `X-User-Id` to the backend stream endpoint
//! - Relay the backend's byte stream untouched as `text/event-stream`
//! - Report backend failures as small JSON error bodies
//!
//! # Design Decisions
//! - Not part of the rule registry; no RPC, no envelope
//! - Bodies are streamed in both directions, never buffered
//! - Buffering disabled end to end (`no-transform`, `X-Accel-Buffering: no`)
//! - A backend read error aborts the client stream

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde_json::json;
use thiserror::Error;

use crate::config::StreamConfig;

/// Header identifying the chatting user.
pub const X_USER_ID: &str = "x-user-id";

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("invalid stream target {url}: {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },

    #[error("failed to build backend request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("backend request failed: {0}")]
    Backend(#[from] hyper_util::client::legacy::Error),
}

/// Relays event streams from the chat backend.
#[derive(Clone)]
pub struct StreamProxy {
    client: Client<HttpConnector, Body>,
    target: Uri,
}

impl StreamProxy {
    pub fn new(config: &StreamConfig) -> Result<Self, StreamError> {
        let url = target_url(config);
        let target = url
            .parse::<Uri>()
            .map_err(|source| StreamError::InvalidTarget { url, source })?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self { client, target })
    }

    pub fn target(&self) -> &Uri {
        &self.target
    }

    /// Forward one streaming request. Always produces a response.
    pub async fn forward(&self, headers: &HeaderMap, body: Body) -> Response {
        match self.open(headers, body).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(target_uri = %self.target, error = %e, "Stream passthrough failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }

    async fn open(&self, headers: &HeaderMap, body: Body) -> Result<Response, StreamError> {
        // 1. Build backend request
        let mut builder = Request::post(self.target.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "text/event-stream");

        if let Some(user_id) = headers.get(X_USER_ID) {
            builder = builder.header(X_USER_ID, user_id.clone());
        }

        let request = builder.body(body)?;

        // 2. Send
        let upstream = self.client.request(request).await?;
        let status = upstream.status();

        if !status.is_success() {
            tracing::warn!(
                target_uri = %self.target,
                status = %status,
                "Stream backend rejected request"
            );
            return Ok(error_response(
                status,
                format!("Backend error: {}", status.as_u16()),
            ));
        }

        // 3. Relay
        let mut response = Response::new(Body::new(upstream.into_body()));
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache, no-transform"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("x-accel-buffering", HeaderValue::from_static("no"));

        Ok(response)
    }
}

fn target_url(config: &StreamConfig) -> String {
    format!("{}{}", config.backend_url.trim_end_matches('/'), config.path)
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
