//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     ToolApi[] (prefix + handler set)
//!     → registry.rs (validate prefixes, reject collisions)
//!     → freeze: sort by prefix length
//!     → Immutable RouteTable
//!
//! Incoming Request (method, path)
//!     → registry.rs (RouteTable::dispatch)
//!     → matcher.rs (segment-aware prefix check)
//!     → Return: Matched mount + remainder, or NotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same mount
//! - Explicit NotFound rather than silent default

pub mod matcher;
pub mod registry;

pub use registry::{Dispatch, Mount, RegistryError, RouteTable, RouterRegistry};
