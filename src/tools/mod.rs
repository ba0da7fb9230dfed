//! Tool handler sets mounted by the gateway.
//!
//! Each tool owns its routes and internal state. The gateway only knows
//! the tool's name, the prefix it mounts under, and the `Router` it
//! hands over; requests reach the router with the prefix stripped.
//!
//! Tools are expected to turn their own domain errors into responses.
//! Anything they let escape (`Err(Fault)`, a panic) is reported by the
//! gateway as an unhandled fault.

pub mod datashark;
pub mod queryhammerhead;
pub mod vizfin;

use axum::Router;

pub use datashark::DataShark;
pub use queryhammerhead::QueryHammerhead;
pub use vizfin::VizFin;

/// Contract a tool satisfies to be mounted.
pub trait ToolApi: Send + Sync {
    /// Display name, reported in service metadata.
    fn name(&self) -> &'static str;

    /// Absolute path prefix, without a trailing slash.
    fn prefix(&self) -> &'static str;

    /// The tool's handler set, rooted at `/`.
    fn routes(&self) -> Router;
}

/// The tools the gateway ships with, in mount order.
pub fn default_tools() -> Vec<Box<dyn ToolApi>> {
    vec![
        Box::new(DataShark),
        Box::new(QueryHammerhead),
        Box::new(VizFin),
    ]
}
