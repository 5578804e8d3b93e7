//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) and echo it on the response
//! - Decide which methods carry a body
//! - Parse the body according to its content type
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Body problems never fail a request; the payload is simply absent
//! - Form bodies become flat string maps, repeated keys keep the last value

use axum::body::Body;
use axum::http::{header, HeaderMap, Method};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer assigning a UUID to requests that arrive without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer copying the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Request ID of an inbound request, for logging.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Parsed request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Form(Map<String, Value>),
    Text(String),
}

impl Payload {
    /// View the payload as a JSON value.
    pub fn into_json(self) -> Value {
        match self {
            Payload::Json(value) => value,
            Payload::Form(map) => Value::Object(map),
            Payload::Text(text) => Value::String(text),
        }
    }

    /// Decode an optional payload into `T`, falling back to `T::default()`.
    pub fn decode_or_default<T>(payload: Option<Payload>) -> T
    where
        T: DeserializeOwned + Default,
    {
        payload
            .and_then(|p| serde_json::from_value(p.into_json()).ok())
            .unwrap_or_default()
    }
}

/// Whether the method's body is parsed at all.
pub fn carries_body(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Read and parse the request body.
pub async fn read_payload(headers: &HeaderMap, body: Body, limit: usize) -> Option<Payload> {
    let bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read request body");
            return None;
        }
    };

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    parse_payload(content_type, &bytes)
}

/// Parse raw body bytes according to `content_type`.
pub fn parse_payload(content_type: &str, bytes: &[u8]) -> Option<Payload> {
    if content_type.contains("application/json") {
        return serde_json::from_slice(bytes).ok().map(Payload::Json);
    }

    if content_type.contains("application/x-www-form-urlencoded") {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(bytes).ok()?;
        let map = pairs
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        return Some(Payload::Form(map));
    }

    let text = String::from_utf8_lossy(bytes);
    if text.is_empty() {
        None
    } else {
        Some(Payload::Text(text.into_owned()))
    }
}
