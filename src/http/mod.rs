//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (request ID, body parsing)
//!     → [routing layer picks the proxy rule]
//!     → [rpc layer builds metadata and calls upstream]
//!     → response.rs (envelope, hook, error rendering)
//!     → Send to client
//!
//! Event streams bypass rules:
//!     server.rs → stream.rs → chat backend → bytes relayed to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod stream;

pub use request::{Payload, X_REQUEST_ID};
pub use response::{Envelope, ResponseCode};
pub use server::{AppState, BffServer};
pub use stream::{StreamError, StreamProxy};
