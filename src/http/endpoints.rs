//! Endpoints served by the gateway itself: `GET /` and `GET /health`.
//!
//! Neither endpoint looks at tool state. Health is a liveness probe only.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;
use crate::http::server::AppState;
use crate::routing::RouteTable;

/// Static description of the running service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    pub message: String,
    pub version: String,
    pub tools: Vec<String>,
    pub docs: String,
}

impl ServiceMetadata {
    pub fn new(config: &GatewayConfig, routes: &RouteTable) -> Self {
        Self {
            message: config.service.name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            tools: routes.tool_names().iter().map(|n| n.to_string()).collect(),
            docs: config.service.docs_path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            message: "All tools operational".to_string(),
        }
    }
}

pub async fn service_metadata(State(state): State<AppState>) -> Json<ServiceMetadata> {
    Json(state.metadata.as_ref().clone())
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::healthy())
}
