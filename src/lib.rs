//! Tools API gateway library.
//!
//! Mounts independently developed tool APIs under path prefixes, applies
//! one cross-origin policy to all of them, and reports every unhandled
//! fault as the same JSON envelope.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod tools;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
