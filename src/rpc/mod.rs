//! gRPC upstream subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy rule
//!     → metadata.rs (session cookie → authorization, uid, roles)
//!     → invoke.rs (attach metadata, call, log, count)
//!     → client.rs (UserRpc / AttractionRpc over lazy tonic channels)
//!     → Upstream service
//!
//! On failure:
//!     tonic::Status → status.rs (HTTP status, response code, msg, detail)
//! ```
//!
//! # Design Decisions
//! - Messages are plain prost structs shared by both directions
//! - Services sit behind traits so handlers never see the transport
//! - Channels connect lazily; an offline service fails per call, not at startup

pub mod client;
pub mod invoke;
pub mod metadata;
pub mod proto;
pub mod status;

pub use client::{AttractionRpc, RpcError, Upstreams, UserRpc};
pub use invoke::invoke;
pub use metadata::MetadataBuilder;
pub use status::TranslatedError;
