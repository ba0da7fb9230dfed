//! Global failure normalization.
//!
//! Every fault that escapes request handling is answered with `500` and an
//! [`ErrorEnvelope`], whatever its origin:
//!
//! ```text
//! handler returns Err(Fault)       → Fault::into_response
//! handler panics                   → CatchPanicLayer → panic_response
//! middleware fails (e.g. timeout)  → HandleErrorLayer → handle_layer_error
//! framework emits a bare 500       → normalize_server_errors
//! ```
//!
//! The original fault is logged before it is replaced by the envelope.

use std::any::Any;

use axum::{
    body::{self, Body},
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tower::BoxError;

use crate::http::response::ErrorEnvelope;
use crate::observability::metrics;

/// Upper bound on a failed response body read back for its message.
const MAX_FAULT_BODY: usize = 64 * 1024;

/// An error a handler could not turn into a response itself.
#[derive(Debug, Error)]
pub enum Fault {
    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] axum::http::Error),

    #[error("{0}")]
    Service(BoxError),
}

impl Fault {
    pub fn internal(message: impl Into<String>) -> Self {
        Fault::Internal(message.into())
    }

    fn kind(&self) -> &'static str {
        match self {
            Fault::Internal(_) => "internal",
            Fault::Json(_) => "json",
            Fault::Http(_) => "http",
            Fault::Service(_) => "service",
        }
    }
}

impl From<BoxError> for Fault {
    fn from(err: BoxError) -> Self {
        Fault::Service(err)
    }
}

impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        report(self.kind(), self.to_string()).into_response()
    }
}

fn report(kind: &'static str, message: String) -> ErrorEnvelope {
    tracing::error!(kind, error = %message, "Unhandled fault");
    metrics::record_fault(kind);
    ErrorEnvelope::internal(message)
}

/// `CatchPanicLayer` handler.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    report("panic", message).into_response()
}

/// `HandleErrorLayer` handler for errors raised by the middleware stack.
pub async fn handle_layer_error(err: BoxError) -> Response {
    Fault::from(err).into_response()
}

/// Rewrite bare `500` responses produced below the boundary into envelopes.
///
/// JSON `500`s are left alone; a tool that shaped its own error keeps it.
/// Other `5xx` statuses pass through untouched.
pub async fn normalize_server_errors(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() != StatusCode::INTERNAL_SERVER_ERROR || is_json(&response) {
        return response;
    }

    let message = match body::to_bytes(response.into_body(), MAX_FAULT_BODY).await {
        Ok(bytes) if !bytes.is_empty() => String::from_utf8_lossy(&bytes).into_owned(),
        _ => "Internal Server Error".to_string(),
    };
    report("response", message).into_response()
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::INTERNAL_ERROR;

    async fn envelope(response: Response) -> ErrorEnvelope {
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_fault_kinds_share_envelope() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let json_text = json_err.to_string();

        let a = envelope(Fault::internal("division by zero").into_response()).await;
        let b = envelope(Fault::from(json_err).into_response()).await;

        assert_eq!(a.error, INTERNAL_ERROR);
        assert_eq!(b.error, INTERNAL_ERROR);
        assert_eq!(a.message, "division by zero");
        assert_eq!(b.message, json_text);
    }

    #[tokio::test]
    async fn test_panic_payloads() {
        let from_str = envelope(panic_response(Box::new("boom"))).await;
        let from_string = envelope(panic_response(Box::new(String::from("bang")))).await;
        let opaque = envelope(panic_response(Box::new(42_u8))).await;

        assert_eq!(from_str.message, "boom");
        assert_eq!(from_string.message, "bang");
        assert_eq!(opaque.message, "handler panicked");
    }

    #[tokio::test]
    async fn test_layer_error_message() {
        let err: BoxError = Box::new(tower::timeout::error::Elapsed::new());
        let env = envelope(handle_layer_error(err).await).await;
        assert_eq!(env.message, "request timed out");
    }
}
