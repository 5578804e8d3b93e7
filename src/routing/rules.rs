//! Proxy rules.
//!
//! Each rule binds one HTTP route to one unary RPC, with a request transform,
//! a response transform and an optional hook that may replace the final
//! response. The set of rules is closed: [`Rule`] names every one of them.

use async_trait::async_trait;
use axum::http::{header, request::Parts, StatusCode};
use axum::response::{IntoResponse, Response as HttpResponse};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tonic::metadata::MetadataMap;
use tonic::{Request, Response, Status};

use crate::http::request::Payload;
use crate::http::response::{compose_failure, compose_success, Envelope};
use crate::rpc::invoke::invoke;
use crate::rpc::proto::attraction::{
    FindAttractionByIdRequest, FindAttractionByIdResponse, FindAttractionsWithinRadiusRequest,
    FindAttractionsWithinRadiusResponse,
};
use crate::rpc::proto::user::{
    ChangePasswordRequest, ChangePasswordResponse, GetCurrentUserRequest, GetCurrentUserResponse,
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};
use crate::rpc::{TranslatedError, Upstreams};
use crate::security::session::SessionCookie;

/// What a response hook gets to see.
pub struct HookContext<'a> {
    pub request: &'a Parts,
    pub envelope: Envelope,
}

/// Binding between an HTTP route and a unary RPC.
#[async_trait]
pub trait ProxyRule: Send + Sync {
    type RpcRequest: DeserializeOwned + Default + Send + 'static;
    type RpcResponse: Serialize + Send + 'static;

    /// Fully-qualified RPC method.
    const RPC: &'static str;

    /// Build the RPC message from the parsed body. Never fails.
    fn build_rpc_request(&self, payload: Option<Payload>) -> Self::RpcRequest {
        Payload::decode_or_default(payload)
    }

    /// Perform the call against the matching service.
    async fn call(
        &self,
        upstreams: &Upstreams,
        request: Request<Self::RpcRequest>,
    ) -> Result<Response<Self::RpcResponse>, Status>;

    /// Shape the RPC result into the envelope's `data`.
    fn build_http_response(&self, response: Self::RpcResponse) -> Value {
        to_value(&response)
    }

    /// Replace the default response. `None` keeps the envelope as is.
    fn response_hook(&self, _ctx: HookContext<'_>) -> Option<HttpResponse> {
        None
    }
}

/// Per-request inputs to a rule.
pub struct Dispatch<'a> {
    pub upstreams: &'a Upstreams,
    pub request: &'a Parts,
    pub payload: Option<Payload>,
    pub metadata: MetadataMap,
}

/// Run `rule` end to end and compose the HTTP response.
pub async fn forward<R: ProxyRule>(rule: &R, ctx: Dispatch<'_>) -> HttpResponse {
    let Dispatch {
        upstreams,
        request,
        payload,
        metadata,
    } = ctx;

    let message = rule.build_rpc_request(payload);

    match invoke(R::RPC, message, Some(metadata), |req| rule.call(upstreams, req)).await {
        Ok(response) => {
            let data = rule.build_http_response(response);
            compose_success(data, |envelope| {
                rule.response_hook(HookContext { request, envelope })
            })
        }
        Err(status) => compose_failure(&TranslatedError::from_status(&status)),
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

// User service

#[derive(Debug, Clone, Default)]
pub struct RegisterRule;

#[async_trait]
impl ProxyRule for RegisterRule {
    type RpcRequest = RegisterRequest;
    type RpcResponse = RegisterResponse;
    const RPC: &'static str = "/tripsphere.user.UserService/Register";

    async fn call(
        &self,
        upstreams: &Upstreams,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        upstreams.user.register(request).await
    }
}

/// Login; the token leaves the body and becomes the session cookie.
#[derive(Debug, Clone)]
pub struct LoginRule {
    session: SessionCookie,
}

impl LoginRule {
    pub fn new(session: SessionCookie) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ProxyRule for LoginRule {
    type RpcRequest = LoginRequest;
    type RpcResponse = LoginResponse;
    const RPC: &'static str = "/tripsphere.user.UserService/Login";

    async fn call(
        &self,
        upstreams: &Upstreams,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        upstreams.user.login(request).await
    }

    fn response_hook(&self, ctx: HookContext<'_>) -> Option<HttpResponse> {
        let mut envelope = ctx.envelope;

        let token = match envelope.data.as_mut() {
            Some(Value::Object(data)) => match data.remove("token") {
                Some(Value::String(token)) => token,
                _ => String::new(),
            },
            _ => String::new(),
        };

        let mut response = (StatusCode::OK, Json(envelope)).into_response();
        if !token.is_empty() {
            if let Some(cookie) = self.session.issue(&token) {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
        }
        Some(response)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetCurrentUserRule;

#[async_trait]
impl ProxyRule for GetCurrentUserRule {
    type RpcRequest = GetCurrentUserRequest;
    type RpcResponse = GetCurrentUserResponse;
    const RPC: &'static str = "/tripsphere.user.UserService/GetCurrentUser";

    async fn call(
        &self,
        upstreams: &Upstreams,
        request: Request<GetCurrentUserRequest>,
    ) -> Result<Response<GetCurrentUserResponse>, Status> {
        upstreams.user.get_current_user(request).await
    }

    fn build_http_response(&self, response: GetCurrentUserResponse) -> Value {
        to_value(&response.user)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChangePasswordRule;

#[async_trait]
impl ProxyRule for ChangePasswordRule {
    type RpcRequest = ChangePasswordRequest;
    type RpcResponse = ChangePasswordResponse;
    const RPC: &'static str = "/tripsphere.user.UserService/ChangePassword";

    async fn call(
        &self,
        upstreams: &Upstreams,
        request: Request<ChangePasswordRequest>,
    ) -> Result<Response<ChangePasswordResponse>, Status> {
        upstreams.user.change_password(request).await
    }
}

// Attraction service

#[derive(Debug, Clone, Default)]
pub struct FindAttractionByIdRule;

#[async_trait]
impl ProxyRule for FindAttractionByIdRule {
    type RpcRequest = FindAttractionByIdRequest;
    type RpcResponse = FindAttractionByIdResponse;
    const RPC: &'static str = "/tripsphere.attraction.AttractionService/FindAttractionById";

    async fn call(
        &self,
        upstreams: &Upstreams,
        request: Request<FindAttractionByIdRequest>,
    ) -> Result<Response<FindAttractionByIdResponse>, Status> {
        upstreams.attraction.find_attraction_by_id(request).await
    }

    fn build_http_response(&self, response: FindAttractionByIdResponse) -> Value {
        to_value(&response.attraction)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NearbyAttractionsRule;

#[async_trait]
impl ProxyRule for NearbyAttractionsRule {
    type RpcRequest = FindAttractionsWithinRadiusRequest;
    type RpcResponse = FindAttractionsWithinRadiusResponse;
    const RPC: &'static str =
        "/tripsphere.attraction.AttractionService/FindAttractionsWithinRadius";

    async fn call(
        &self,
        upstreams: &Upstreams,
        request: Request<FindAttractionsWithinRadiusRequest>,
    ) -> Result<Response<FindAttractionsWithinRadiusResponse>, Status> {
        upstreams.attraction.find_attractions_within_radius(request).await
    }

    fn build_http_response(&self, response: FindAttractionsWithinRadiusResponse) -> Value {
        to_value(&response.content)
    }
}

/// Every proxy rule the BFF knows about.
#[derive(Debug, Clone)]
pub enum Rule {
    Register(RegisterRule),
    Login(LoginRule),
    GetCurrentUser(GetCurrentUserRule),
    ChangePassword(ChangePasswordRule),
    FindAttractionById(FindAttractionByIdRule),
    NearbyAttractions(NearbyAttractionsRule),
}

impl Rule {
    /// Short label for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Register(_) => "user.register",
            Rule::Login(_) => "user.login",
            Rule::GetCurrentUser(_) => "user.get_current_user",
            Rule::ChangePassword(_) => "user.change_password",
            Rule::FindAttractionById(_) => "attraction.find_by_id",
            Rule::NearbyAttractions(_) => "attraction.nearby",
        }
    }

    pub fn rpc(&self) -> &'static str {
        match self {
            Rule::Register(_) => RegisterRule::RPC,
            Rule::Login(_) => LoginRule::RPC,
            Rule::GetCurrentUser(_) => GetCurrentUserRule::RPC,
            Rule::ChangePassword(_) => ChangePasswordRule::RPC,
            Rule::FindAttractionById(_) => FindAttractionByIdRule::RPC,
            Rule::NearbyAttractions(_) => NearbyAttractionsRule::RPC,
        }
    }

    pub async fn dispatch(&self, ctx: Dispatch<'_>) -> HttpResponse {
        match self {
            Rule::Register(rule) => forward(rule, ctx).await,
            Rule::Login(rule) => forward(rule, ctx).await,
            Rule::GetCurrentUser(rule) => forward(rule, ctx).await,
            Rule::ChangePassword(rule) => forward(rule, ctx).await,
            Rule::FindAttractionById(rule) => forward(rule, ctx).await,
            Rule::NearbyAttractions(rule) => forward(rule, ctx).await,
        }
    }
}
