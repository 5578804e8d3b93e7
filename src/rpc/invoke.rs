//! Unary RPC invocation.
//!
//! Wraps every upstream call with the per-request metadata, a log line and
//! an outcome counter. Failures are returned untouched for translation.

use std::future::Future;
use std::time::Instant;

use tonic::metadata::MetadataMap;
use tonic::{Code, Request, Response, Status};

use crate::observability::metrics;
use crate::rpc::status::code_name;

/// Invoke `call` with `message` and optional metadata.
///
/// `rpc` is the fully-qualified method name, used for logs and metrics only.
pub async fn invoke<Req, Resp, F, Fut>(
    rpc: &'static str,
    message: Req,
    metadata: Option<MetadataMap>,
    call: F,
) -> Result<Resp, Status>
where
    F: FnOnce(Request<Req>) -> Fut,
    Fut: Future<Output = Result<Response<Resp>, Status>>,
{
    let mut request = Request::new(message);
    if let Some(metadata) = metadata {
        *request.metadata_mut() = metadata;
    }

    let start = Instant::now();
    let result = call(request).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match &result {
        Ok(_) => {
            tracing::debug!(rpc = rpc, elapsed_ms, "RPC succeeded");
            metrics::record_rpc(rpc, code_name(Code::Ok));
        }
        Err(status) => {
            tracing::warn!(
                rpc = rpc,
                elapsed_ms,
                code = code_name(status.code()),
                message = %status.message(),
                "RPC failed"
            );
            metrics::record_rpc(rpc, code_name(status.code()));
        }
    }

    result.map(Response::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metadata_is_attached() {
        let mut metadata = MetadataMap::new();
        metadata.insert("uid", "u1".parse().unwrap());

        let echo = |request: Request<u32>| async move {
            let uid = request
                .metadata()
                .get("uid")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            Ok(Response::new((request.into_inner(), uid)))
        };
        let seen = invoke("/test.Svc/Echo", 7u32, Some(metadata), echo).await.unwrap();

        assert_eq!(seen, (7, Some("u1".to_string())));
    }

    #[tokio::test]
    async fn test_without_metadata() {
        let empty = invoke("/test.Svc/Echo", (), None, |request: Request<()>| async move {
            Ok(Response::new(request.metadata().is_empty()))
        })
        .await
        .unwrap();
        assert!(empty);
    }

    #[tokio::test]
    async fn test_status_is_passed_through() {
        let err = invoke("/test.Svc/Fail", (), None, |_: Request<()>| async {
            Err::<Response<()>, _>(Status::already_exists("Username already exists"))
        })
        .await
        .unwrap_err();

        assert_eq!(err.code(), Code::AlreadyExists);
        assert_eq!(err.message(), "Username already exists");
    }
}
