//! Backend-for-frontend gRPC proxy library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod rpc;
pub mod security;

pub use config::schema::BffConfig;
pub use http::BffServer;
pub use lifecycle::Shutdown;
pub use rpc::Upstreams;
