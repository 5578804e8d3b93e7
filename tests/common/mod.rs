//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tonic::metadata::MetadataMap;
use tonic::{Request, Response, Status};

use trip_bff::config::BffConfig;
use trip_bff::rpc::proto::attraction::{
    Attraction, FindAttractionByIdRequest, FindAttractionByIdResponse,
    FindAttractionsWithinRadiusRequest, FindAttractionsWithinRadiusResponse,
};
use trip_bff::rpc::proto::user::{
    ChangePasswordRequest, ChangePasswordResponse, GetCurrentUserRequest, GetCurrentUserResponse,
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User,
};
use trip_bff::rpc::{AttractionRpc, Upstreams, UserRpc};
use trip_bff::{BffServer, Shutdown};

/// One call observed by a mock service.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: &'static str,
    pub metadata: MetadataMap,
    pub message: Value,
}

impl Recorded {
    pub fn meta(&self, key: &str) -> Option<String> {
        self.metadata
            .get(key)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

#[derive(Default)]
struct Journal(Mutex<Vec<Recorded>>);

impl Journal {
    fn record<T: Serialize>(&self, method: &'static str, request: &Request<T>) {
        self.0.lock().unwrap().push(Recorded {
            method,
            metadata: request.metadata().clone(),
            message: serde_json::to_value(request.get_ref()).unwrap(),
        });
    }

    fn calls(&self, method: &str) -> Vec<Recorded> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }
}

/// Programmable user service.
pub struct MockUser {
    pub current_user: Result<Option<User>, Status>,
    pub login: Result<LoginResponse, Status>,
    pub register: Result<(), Status>,
    journal: Journal,
}

impl MockUser {
    pub fn new() -> Self {
        Self {
            current_user: Ok(None),
            login: Err(Status::unimplemented("login")),
            register: Ok(()),
            journal: Journal::default(),
        }
    }

    pub fn calls(&self, method: &str) -> Vec<Recorded> {
        self.journal.calls(method)
    }
}

#[async_trait]
impl UserRpc for MockUser {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        self.journal.record("Register", &request);
        self.register.clone().map(|()| Response::new(RegisterResponse {}))
    }

    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        self.journal.record("Login", &request);
        self.login.clone().map(Response::new)
    }

    async fn get_current_user(
        &self,
        request: Request<GetCurrentUserRequest>,
    ) -> Result<Response<GetCurrentUserResponse>, Status> {
        self.journal.record("GetCurrentUser", &request);
        self.current_user
            .clone()
            .map(|user| Response::new(GetCurrentUserResponse { user }))
    }

    async fn change_password(
        &self,
        request: Request<ChangePasswordRequest>,
    ) -> Result<Response<ChangePasswordResponse>, Status> {
        self.journal.record("ChangePassword", &request);
        Ok(Response::new(ChangePasswordResponse {}))
    }
}

/// Programmable attraction service.
pub struct MockAttraction {
    pub nearby: Result<Vec<Attraction>, Status>,
    pub by_id: Result<Option<Attraction>, Status>,
    /// Time each call waits before answering.
    pub latency: Duration,
    journal: Journal,
}

impl MockAttraction {
    pub fn new() -> Self {
        Self {
            nearby: Ok(Vec::new()),
            by_id: Ok(None),
            latency: Duration::ZERO,
            journal: Journal::default(),
        }
    }

    pub fn calls(&self, method: &str) -> Vec<Recorded> {
        self.journal.calls(method)
    }
}

#[async_trait]
impl AttractionRpc for MockAttraction {
    async fn find_attraction_by_id(
        &self,
        request: Request<FindAttractionByIdRequest>,
    ) -> Result<Response<FindAttractionByIdResponse>, Status> {
        self.journal.record("FindAttractionById", &request);
        tokio::time::sleep(self.latency).await;
        self.by_id
            .clone()
            .map(|attraction| Response::new(FindAttractionByIdResponse { attraction }))
    }

    async fn find_attractions_within_radius(
        &self,
        request: Request<FindAttractionsWithinRadiusRequest>,
    ) -> Result<Response<FindAttractionsWithinRadiusResponse>, Status> {
        self.journal.record("FindAttractionsWithinRadius", &request);
        tokio::time::sleep(self.latency).await;
        self.nearby
            .clone()
            .map(|content| Response::new(FindAttractionsWithinRadiusResponse { content }))
    }
}

pub fn user(id: &str, roles: &[&str]) -> User {
    User {
        id: id.to_string(),
        username: format!("{id}-name"),
        roles: roles.iter().map(|r| r.to_string()).collect(),
    }
}

/// Start the BFF on `addr` over the given mocks.
pub async fn start_bff(
    addr: SocketAddr,
    config: BffConfig,
    user: Arc<MockUser>,
    attraction: Arc<MockAttraction>,
) -> Shutdown {
    let upstreams = Upstreams { user, attraction };
    let server = BffServer::new(config, upstreams).unwrap();
    let listener = TcpListener::bind(addr).await.unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Start a raw-TCP event-stream backend.
///
/// Each connection gets `status`; a 200 is followed by `events`, written one
/// at a time, then the connection closes. Raw requests are pushed to the
/// returned journal.
pub async fn start_sse_backend(
    addr: SocketAddr,
    status: u16,
    events: Vec<&'static str>,
) -> Arc<Mutex<Vec<String>>> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let journal = seen.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let journal = journal.clone();
            let events = events.clone();
            tokio::spawn(async move {
                let raw = read_request(&mut socket).await;
                journal.lock().unwrap().push(raw);

                if status != 200 {
                    let body = "backend unhappy";
                    let response = format!(
                        "HTTP/1.1 {} Error\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                    return;
                }

                let head = concat!(
                    "HTTP/1.1 200 OK\r\n",
                    "Content-Type: text/event-stream\r\n",
                    "Connection: close\r\n\r\n",
                );
                let _ = socket.write_all(head.as_bytes()).await;
                for event in events {
                    let _ = socket.write_all(event.as_bytes()).await;
                    let _ = socket.flush().await;
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                let _ = socket.shutdown().await;
            });
        }
    });

    seen
}

/// Start an event-stream backend that fails partway through the body.
///
/// Each connection gets a chunked 200 carrying `event`, then a chunk that
/// announces more bytes than it sends before the socket is dropped.
pub async fn start_broken_sse_backend(addr: SocketAddr, event: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request(&mut socket).await;

                let head = concat!(
                    "HTTP/1.1 200 OK\r\n",
                    "Content-Type: text/event-stream\r\n",
                    "Transfer-Encoding: chunked\r\n\r\n",
                );
                let first = format!("{:x}\r\n{}\r\n", event.len(), event);
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(first.as_bytes()).await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_millis(50)).await;

                let _ = socket.write_all(b"40\r\ndata: cut").await;
                let _ = socket.flush().await;
                drop(socket);
            });
        }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// Read one HTTP/1.1 request (headers plus a sized or chunked body).
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        let Some(head_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let head = text[..head_end].to_ascii_lowercase();
        let body = &text[head_end + 4..];

        if head.contains("transfer-encoding: chunked") {
            if body.ends_with("0\r\n\r\n") {
                break;
            }
            continue;
        }

        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if body.len() >= length {
            break;
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}
