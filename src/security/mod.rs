//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → session.rs (bearer token from the session cookie)
//!     → Pass to metadata builder
//!
//! Login / logout:
//!     → session.rs (issue / clear Set-Cookie)
//! ```
//!
//! # Design Decisions
//! - The BFF never validates tokens itself; upstream services do
//! - No trust in client input: unreadable cookies count as no session

pub mod session;

pub use session::SessionCookie;
