//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → cors.rs (cross-origin policy, preflight short-circuit)
//!     → failure.rs (panic / error / timeout boundary)
//!     → endpoints.rs (`/`, `/health`) or dispatch to a tool
//!     → response.rs (404 body, error envelope)
//!     → Send to client
//! ```

pub mod cors;
pub mod endpoints;
pub mod failure;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use failure::Fault;
pub use request::X_REQUEST_ID;
pub use response::{ErrorEnvelope, NotFoundBody};
pub use server::GatewayServer;
