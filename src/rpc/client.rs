//! gRPC clients for the backend services.
//!
//! # Responsibilities
//! - Describe each backend service as an object-safe async trait
//! - Implement the traits over shared tonic channels
//! - Bundle the clients into one process-wide `Upstreams` value
//!
//! # Design Decisions
//! - Channels are created lazily; the BFF starts while services are down
//! - One channel per service, cloned per call (tonic multiplexes over it)
//! - Per-call deadlines come from the channel, not from the caller

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tonic::client::Grpc;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Response, Status};
use tonic_prost::ProstCodec;

use crate::config::{UpstreamConfig, UpstreamsConfig};
use crate::rpc::proto::attraction::{
    FindAttractionByIdRequest, FindAttractionByIdResponse, FindAttractionsWithinRadiusRequest,
    FindAttractionsWithinRadiusResponse,
};
use crate::rpc::proto::user::{
    ChangePasswordRequest, ChangePasswordResponse, GetCurrentUserRequest, GetCurrentUserResponse,
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};

/// Error raised while preparing upstream channels.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid endpoint {endpoint}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },
}

/// `tripsphere.user.UserService`.
#[async_trait]
pub trait UserRpc: Send + Sync {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status>;

    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status>;

    async fn get_current_user(
        &self,
        request: Request<GetCurrentUserRequest>,
    ) -> Result<Response<GetCurrentUserResponse>, Status>;

    async fn change_password(
        &self,
        request: Request<ChangePasswordRequest>,
    ) -> Result<Response<ChangePasswordResponse>, Status>;
}

/// `tripsphere.attraction.AttractionService`.
#[async_trait]
pub trait AttractionRpc: Send + Sync {
    async fn find_attraction_by_id(
        &self,
        request: Request<FindAttractionByIdRequest>,
    ) -> Result<Response<FindAttractionByIdResponse>, Status>;

    async fn find_attractions_within_radius(
        &self,
        request: Request<FindAttractionsWithinRadiusRequest>,
    ) -> Result<Response<FindAttractionsWithinRadiusResponse>, Status>;
}

/// The set of backend clients shared by every request.
#[derive(Clone)]
pub struct Upstreams {
    pub user: Arc<dyn UserRpc>,
    pub attraction: Arc<dyn AttractionRpc>,
}

impl Upstreams {
    /// Build lazily-connected tonic clients for every configured service.
    pub fn connect_lazy(config: &UpstreamsConfig) -> Result<Self, RpcError> {
        let user = GrpcUnary::new(lazy_channel(&config.user)?);
        let attraction = GrpcUnary::new(lazy_channel(&config.attraction)?);

        tracing::info!(
            user = %config.user.endpoint,
            attraction = %config.attraction.endpoint,
            "gRPC channels configured"
        );

        Ok(Self {
            user: Arc::new(UserServiceClient { inner: user }),
            attraction: Arc::new(AttractionServiceClient { inner: attraction }),
        })
    }
}

fn lazy_channel(config: &UpstreamConfig) -> Result<Channel, RpcError> {
    let endpoint = Endpoint::from_shared(config.endpoint.clone())
        .map_err(|source| RpcError::InvalidEndpoint {
            endpoint: config.endpoint.clone(),
            source,
        })?
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs));

    Ok(endpoint.connect_lazy())
}

/// Unary call helper over a tonic channel.
#[derive(Clone)]
struct GrpcUnary {
    inner: Grpc<Channel>,
}

impl GrpcUnary {
    fn new(channel: Channel) -> Self {
        Self { inner: Grpc::new(channel) }
    }

    async fn call<Req, Resp>(
        &self,
        path: &'static str,
        request: Request<Req>,
    ) -> Result<Response<Resp>, Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = self.inner.clone();
        grpc.ready()
            .await
            .map_err(|e| Status::unavailable(format!("Service was not ready: {e}")))?;

        let codec = ProstCodec::<Req, Resp>::default();
        grpc.unary(request, PathAndQuery::from_static(path), codec).await
    }
}

struct UserServiceClient {
    inner: GrpcUnary,
}

#[async_trait]
impl UserRpc for UserServiceClient {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        self.inner.call("/tripsphere.user.UserService/Register", request).await
    }

    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        self.inner.call("/tripsphere.user.UserService/Login", request).await
    }

    async fn get_current_user(
        &self,
        request: Request<GetCurrentUserRequest>,
    ) -> Result<Response<GetCurrentUserResponse>, Status> {
        self.inner.call("/tripsphere.user.UserService/GetCurrentUser", request).await
    }

    async fn change_password(
        &self,
        request: Request<ChangePasswordRequest>,
    ) -> Result<Response<ChangePasswordResponse>, Status> {
        self.inner.call("/tripsphere.user.UserService/ChangePassword", request).await
    }
}

struct AttractionServiceClient {
    inner: GrpcUnary,
}

#[async_trait]
impl AttractionRpc for AttractionServiceClient {
    async fn find_attraction_by_id(
        &self,
        request: Request<FindAttractionByIdRequest>,
    ) -> Result<Response<FindAttractionByIdResponse>, Status> {
        self.inner
            .call("/tripsphere.attraction.AttractionService/FindAttractionById", request)
            .await
    }

    async fn find_attractions_within_radius(
        &self,
        request: Request<FindAttractionsWithinRadiusRequest>,
    ) -> Result<Response<FindAttractionsWithinRadiusResponse>, Status> {
        self.inner
            .call("/tripsphere.attraction.AttractionService/FindAttractionsWithinRadius", request)
            .await
    }
}
