//! Response bodies the gateway itself produces.
//!
//! # Responsibilities
//! - Define the 404 body for paths no tool serves
//! - Define the error envelope every unhandled fault is reported with
//!
//! # Design Decisions
//! - Both shapes are fixed contracts, independent of which tool was hit
//! - Envelopes are built per request and never cached

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Category label carried by every error envelope.
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Body returned with `500` for any unhandled fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            error: INTERNAL_ERROR.to_string(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

/// Body returned with `404` when nothing serves the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotFoundBody {
    pub detail: String,
}

impl Default for NotFoundBody {
    fn default() -> Self {
        Self {
            detail: "Not Found".to_string(),
        }
    }
}

impl IntoResponse for NotFoundBody {
    fn into_response(self) -> Response {
        (StatusCode::NOT_FOUND, Json(self)).into_response()
    }
}

/// Fallback handler for routing misses.
pub async fn not_found() -> NotFoundBody {
    NotFoundBody::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let value = serde_json::to_value(ErrorEnvelope::internal("division by zero")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "error": "Internal server error",
                "message": "division by zero",
            })
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ErrorEnvelope::internal("x").into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(NotFoundBody::default().into_response().status(), StatusCode::NOT_FOUND);
    }
}
