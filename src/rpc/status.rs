//! Translation of gRPC failures into HTTP terms.
//!
//! # Responsibilities
//! - Map gRPC status codes to HTTP status codes
//! - Map gRPC status codes to application response codes
//! - Extract a human-readable description from the status message
//! - Decode structured `Details` from `grpc-status-details-bin`
//!
//! # Design Decisions
//! - Unknown or unmapped codes become 502 / `Error`
//! - Detail decoding never fails the response; bad payloads are dropped

use axum::http::StatusCode;
use prost::Message;
use serde::Serialize;
use tonic::{Code, Status};

use crate::http::response::ResponseCode;
use crate::rpc::proto::common::{Details, Reason};

/// Metadata key carrying binary status details.
pub const STATUS_DETAILS_KEY: &str = "grpc-status-details-bin";

const UNKNOWN_ERROR: &str = "Unknown error";

/// Structured error detail surfaced as `error` in the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub reason: &'static str,
    pub msg: String,
}

/// Everything the response composer needs to render a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedError {
    pub status: StatusCode,
    pub code: ResponseCode,
    pub msg: String,
    pub detail: Option<ErrorDetail>,
}

impl TranslatedError {
    /// Translate a gRPC status.
    pub fn from_status(status: &Status) -> Self {
        let code = status.code();
        Self {
            status: http_status_for(code),
            code: response_code_for(Some(code as i32)),
            msg: status_description(status),
            detail: extract_error_detail(status),
        }
    }
}

/// Map a gRPC status code to an HTTP status code.
pub fn http_status_for(code: Code) -> StatusCode {
    match code {
        Code::InvalidArgument | Code::OutOfRange | Code::FailedPrecondition => {
            StatusCode::BAD_REQUEST
        }
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists | Code::Aborted => StatusCode::CONFLICT,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

/// Map a raw gRPC status code to an application response code.
///
/// Absent or out-of-range codes map to `Error`.
pub fn response_code_for(code: Option<i32>) -> ResponseCode {
    let Some(code) = code.filter(|c| (0..=16).contains(c)) else {
        return ResponseCode::Error;
    };

    match Code::from(code) {
        Code::Ok => ResponseCode::Success,
        Code::NotFound => ResponseCode::NotFound,
        Code::InvalidArgument | Code::OutOfRange | Code::FailedPrecondition => {
            ResponseCode::BadRequest
        }
        Code::Unauthenticated => ResponseCode::Unauthorized,
        Code::PermissionDenied => ResponseCode::Forbidden,
        _ => ResponseCode::Error,
    }
}

/// Canonical `SCREAMING_SNAKE_CASE` name of a gRPC code.
pub fn code_name(code: Code) -> &'static str {
    match code {
        Code::Ok => "OK",
        Code::Cancelled => "CANCELLED",
        Code::Unknown => "UNKNOWN",
        Code::InvalidArgument => "INVALID_ARGUMENT",
        Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
        Code::NotFound => "NOT_FOUND",
        Code::AlreadyExists => "ALREADY_EXISTS",
        Code::PermissionDenied => "PERMISSION_DENIED",
        Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
        Code::FailedPrecondition => "FAILED_PRECONDITION",
        Code::Aborted => "ABORTED",
        Code::OutOfRange => "OUT_OF_RANGE",
        Code::Unimplemented => "UNIMPLEMENTED",
        Code::Internal => "INTERNAL",
        Code::Unavailable => "UNAVAILABLE",
        Code::DataLoss => "DATA_LOSS",
        Code::Unauthenticated => "UNAUTHENTICATED",
    }
}

/// Render a status the way it appears on the wire: `"<code> <NAME>: <description>"`.
pub fn wire_message(status: &Status) -> String {
    let code = status.code();
    format!("{} {}: {}", code as i32, code_name(code), status.message())
}

/// Description of a failed call suitable for end users.
pub fn status_description(status: &Status) -> String {
    if status.message().trim().is_empty() {
        return UNKNOWN_ERROR.to_string();
    }
    extract_description(&wire_message(status))
}

/// Strip everything up to and including the first colon.
///
/// `"6 ALREADY_EXISTS: Username already exists"` becomes `"Username already exists"`.
/// Messages without a colon, or ending in one, are returned unchanged.
pub fn extract_description(message: &str) -> String {
    if message.is_empty() {
        return UNKNOWN_ERROR.to_string();
    }

    match message.find(':') {
        Some(idx) if idx < message.len() - 1 => message[idx + 1..].trim().to_string(),
        _ => message.to_string(),
    }
}

/// Decode the structured detail attached to a status, if any.
pub fn extract_error_detail(status: &Status) -> Option<ErrorDetail> {
    let from_metadata = status
        .metadata()
        .get_bin(STATUS_DETAILS_KEY)
        .and_then(|value| value.to_bytes().ok());

    let bytes = if !status.details().is_empty() {
        status.details().to_vec()
    } else {
        from_metadata?.to_vec()
    };

    if bytes.is_empty() {
        return None;
    }

    let details = match Details::decode(bytes.as_slice()) {
        Ok(details) => details,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to decode gRPC error details");
            return None;
        }
    };

    let reason = Reason::try_from(details.reason).ok()?;
    let msg = if !details.msg.is_empty() {
        details.msg
    } else if !status.message().is_empty() {
        status.message().to_string()
    } else {
        UNKNOWN_ERROR.to_string()
    };

    Some(ErrorDetail {
        reason: reason.as_str_name(),
        msg,
    })
}
