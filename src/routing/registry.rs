//! Route registration and dispatch.
//!
//! # Responsibilities
//! - Bind each tool's handler set to its path prefix at startup
//! - Reject colliding or malformed prefixes before traffic is accepted
//! - Look up the mount for a request path, or report an explicit miss
//!
//! # Design Decisions
//! - Registration happens through a builder; `freeze` yields an immutable table
//! - Longest prefix wins when prefixes nest
//! - O(n) prefix scan (acceptable for a handful of tools)

use std::fmt;

use axum::http::Method;
use axum::Router;
use thiserror::Error;

use crate::http::response::not_found;
use crate::routing::matcher::PathPrefixMatcher;
use crate::tools::ToolApi;

/// Paths served by the gateway itself. No tool may mount on them.
pub const RESERVED_PATHS: &[&str] = &["/", "/health"];

/// Error raised while building the route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("prefix '{prefix}' for {tool} is already registered by {existing}")]
    PrefixCollision {
        prefix: String,
        tool: &'static str,
        existing: &'static str,
    },

    #[error("prefix '{prefix}' for {tool} is invalid: {reason}")]
    InvalidPrefix {
        prefix: String,
        tool: &'static str,
        reason: &'static str,
    },
}

/// A tool's handler set bound to its prefix.
pub struct Mount {
    name: &'static str,
    matcher: PathPrefixMatcher,
    service: Router,
}

impl Mount {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    /// A handle to the handler set. Routers are cheap to clone.
    pub fn service(&self) -> Router {
        self.service.clone()
    }
}

impl fmt::Debug for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mount")
            .field("name", &self.name)
            .field("prefix", &self.prefix())
            .finish_non_exhaustive()
    }
}

/// Outcome of a route lookup.
#[derive(Debug)]
pub enum Dispatch<'a> {
    /// The path lies under `mount`; `remainder` is the path with the prefix removed.
    Matched { mount: &'a Mount, remainder: &'a str },
    /// No prefix matched. Expected outcome, answered with 404.
    NotFound,
}

/// Collects tool mounts during startup.
#[derive(Debug, Default)]
pub struct RouterRegistry {
    mounts: Vec<Mount>,
}

impl RouterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `tool`'s handler set to its prefix.
    pub fn register(&mut self, tool: &dyn ToolApi) -> Result<(), RegistryError> {
        let name = tool.name();
        let prefix = tool.prefix();

        if let Some(reason) = prefix_problem(prefix) {
            return Err(RegistryError::InvalidPrefix {
                prefix: prefix.to_string(),
                tool: name,
                reason,
            });
        }

        let matcher = PathPrefixMatcher::new(prefix);
        for existing in &self.mounts {
            if existing.prefix() == prefix {
                return Err(RegistryError::PrefixCollision {
                    prefix: prefix.to_string(),
                    tool: name,
                    existing: existing.name,
                });
            }
            if existing.matcher.matches(prefix) || matcher.matches(existing.prefix()) {
                tracing::warn!(
                    tool = name,
                    prefix,
                    other = existing.name,
                    other_prefix = existing.prefix(),
                    "Nested tool prefixes; longest prefix wins"
                );
            }
        }

        tracing::info!(tool = name, prefix, "Mounted tool");
        self.mounts.push(Mount {
            name,
            matcher,
            service: tool.routes().fallback(not_found),
        });
        Ok(())
    }

    /// Finish registration and produce the immutable route table.
    pub fn freeze(self) -> RouteTable {
        let names = self.mounts.iter().map(|m| m.name).collect();
        let mut mounts = self.mounts;
        mounts.sort_by(|a, b| b.prefix().len().cmp(&a.prefix().len()));
        RouteTable { mounts, names }
    }
}

fn prefix_problem(prefix: &str) -> Option<&'static str> {
    if !prefix.starts_with('/') {
        Some("must start with '/'")
    } else if prefix.ends_with('/') {
        Some("must not end with '/'")
    } else if RESERVED_PATHS.contains(&prefix) {
        Some("shadows a gateway endpoint")
    } else {
        None
    }
}

/// Immutable prefix → handler set table.
#[derive(Debug)]
pub struct RouteTable {
    /// Sorted by prefix length, longest first.
    mounts: Vec<Mount>,
    /// Tool names in registration order.
    names: Vec<&'static str>,
}

impl RouteTable {
    /// Find the handler set responsible for `path`.
    pub fn dispatch<'a>(&'a self, method: &Method, path: &'a str) -> Dispatch<'a> {
        for mount in &self.mounts {
            if let Some(remainder) = mount.matcher.remainder(path) {
                tracing::trace!(%method, path, tool = mount.name, "Route matched");
                return Dispatch::Matched { mount, remainder };
            }
        }
        Dispatch::NotFound
    }

    /// Mounted tool names, in registration order.
    pub fn tool_names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}
