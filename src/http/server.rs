//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Mount every tool through the router registry
//! - Create the Axum Router with gateway endpoints and the dispatch fallback
//! - Wire up middleware (CORS, failure boundary, request ID, tracing)
//! - Bind server to listener and shut down gracefully
//!
//! # Layer order (outermost first)
//! ```text
//! SetRequestId → Trace → PropagateRequestId → [security headers]
//!     → preflight gate → CORS → metrics → CatchPanic → HandleError(Timeout)
//!     → normalize 500s → routes / dispatch
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    extract::{Request, State},
    http::{uri::PathAndQuery, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower::{timeout::TimeoutLayer, ServiceBuilder, ServiceExt};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::http::cors::{gate_preflight, CorsPolicy, PreflightGate};
use crate::http::endpoints::{self, ServiceMetadata};
use crate::http::failure::{self, Fault};
use crate::http::headers::with_security_headers;
use crate::http::request::{propagate_request_id_layer, request_id_of, set_request_id_layer};
use crate::http::response::NotFoundBody;
use crate::observability::metrics::{self, RouteLabel};
use crate::routing::{Dispatch, RegistryError, RouteTable, RouterRegistry};
use crate::tools::{self, ToolApi};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub metadata: Arc<ServiceMetadata>,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a server mounting the default tools.
    pub fn new(config: GatewayConfig) -> Result<Self, RegistryError> {
        Self::with_tools(config, tools::default_tools())
    }

    /// Create a server mounting `tools`, in order.
    ///
    /// Fails if two tools claim the same prefix.
    pub fn with_tools(
        config: GatewayConfig,
        tools: Vec<Box<dyn ToolApi>>,
    ) -> Result<Self, RegistryError> {
        let mut registry = RouterRegistry::new();
        for tool in &tools {
            registry.register(tool.as_ref())?;
        }
        let routes = Arc::new(registry.freeze());
        let metadata = Arc::new(ServiceMetadata::new(&config, &routes));
        let cors = CorsPolicy::from_config(&config.cors);

        let state = AppState { routes, metadata };
        let router = Self::build_router(&config, &cors, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, cors: &CorsPolicy, state: AppState) -> Router {
        let inner = Router::new()
            .route("/", get(endpoints::service_metadata))
            .route("/health", get(endpoints::health))
            .fallback(dispatch)
            .with_state(state)
            .layer(middleware::from_fn(failure::normalize_server_errors))
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(failure::handle_layer_error))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
            .layer(CatchPanicLayer::custom(failure::panic_response))
            .layer(middleware::from_fn(metrics::track_requests));

        let gate = PreflightGate::new(inner.clone(), cors);
        let router = inner
            .layer(cors.layer())
            .layer(middleware::from_fn_with_state(gate, gate_preflight));

        let router = if config.security.enable_headers {
            with_security_headers(router)
        } else {
            router
        };

        router
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id_of(request)
                )
            }))
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` resolves, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered application router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Fallback handler: hand the request to the tool owning its prefix.
async fn dispatch(State(state): State<AppState>, request: Request) -> Result<Response, Fault> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let (mount, remainder) = match state.routes.dispatch(&method, &path) {
        Dispatch::Matched { mount, remainder } => (mount, remainder),
        Dispatch::NotFound => {
            tracing::debug!(
                request_id = %request_id_of(&request),
                method = %method,
                path = %path,
                "No route matched"
            );
            let mut response = NotFoundBody::default().into_response();
            response.extensions_mut().insert(RouteLabel("none"));
            return Ok(response);
        }
    };

    let request = strip_prefix(request, remainder)?;
    let mut response = match mount.service().oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    response.extensions_mut().insert(RouteLabel(mount.name()));
    Ok(response)
}

/// Rewrite the request URI to what the tool sees: the path below its
/// prefix, with the query string untouched.
fn strip_prefix(mut request: Request, remainder: &str) -> Result<Request, Fault> {
    let path = if remainder.is_empty() { "/" } else { remainder };
    let path_and_query = match request.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    let mut parts = request.uri().clone().into_parts();
    parts.path_and_query =
        Some(PathAndQuery::try_from(path_and_query).map_err(axum::http::Error::from)?);
    *request.uri_mut() = Uri::from_parts(parts).map_err(axum::http::Error::from)?;
    Ok(request)
}
