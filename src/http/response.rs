//! Response envelope and composition.
//!
//! # Responsibilities
//! - Define the `{data, code, msg, error?}` envelope every API route returns
//! - Wrap successful RPC results and give rules a chance to override them
//! - Render translated gRPC failures with their mapped HTTP status
//!
//! # Design Decisions
//! - `code = Success` never carries `error`; failures never carry `data`
//! - A hook's response is returned verbatim, bypassing the default envelope

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rpc::status::{ErrorDetail, TranslatedError};

/// Application-level response code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseCode {
    Success,
    Error,
    NotFound,
    BadRequest,
    Forbidden,
    Unauthorized,
}

/// Uniform JSON body for every proxied response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub code: ResponseCode,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self::success_with_msg(data, "Success")
    }

    pub fn success_with_msg(data: Value, msg: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            code: ResponseCode::Success,
            msg: msg.into(),
            error: None,
        }
    }

    pub fn failure(error: &TranslatedError) -> Self {
        Self {
            data: None,
            code: error.code,
            msg: error.msg.clone(),
            error: error.detail.clone(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            data: None,
            code: ResponseCode::NotFound,
            msg: "Not Found".to_string(),
            error: None,
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status = match self.code {
            ResponseCode::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::OK,
        };
        (status, Json(self)).into_response()
    }
}

/// Build the final response for a successful call.
///
/// `hook` receives the success envelope; returning `Some` replaces the default response.
pub fn compose_success<F>(data: Value, hook: F) -> Response
where
    F: FnOnce(Envelope) -> Option<Response>,
{
    let envelope = Envelope::success(data);
    match hook(envelope.clone()) {
        Some(response) => response,
        None => (StatusCode::OK, Json(envelope)).into_response(),
    }
}

/// Build the final response for a failed call.
pub fn compose_failure(error: &TranslatedError) -> Response {
    (error.status, Json(Envelope::failure(error))).into_response()
}

/// Standard 404 for unknown routes.
pub fn not_found() -> Response {
    Envelope::not_found().into_response()
}

/// Rewrite bare timeout and body-limit rejections from tower-http into envelopes.
///
/// Responses that already carry JSON pass through untouched.
pub async fn envelope_rejections(response: Response) -> Response {
    let status = response.status();
    let (code, msg) = match status {
        StatusCode::REQUEST_TIMEOUT => (ResponseCode::Error, "Request Timeout"),
        StatusCode::PAYLOAD_TOO_LARGE => (ResponseCode::BadRequest, "Payload Too Large"),
        _ => return response,
    };

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);

    let envelope = Envelope {
        data: None,
        code,
        msg: msg.to_string(),
        error: None,
    };
    let mut rewritten = (status, Json(envelope)).into_response();
    for (name, value) in parts.headers.iter() {
        rewritten.headers_mut().append(name.clone(), value.clone());
    }
    rewritten
}
