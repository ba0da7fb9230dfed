//! Cross-origin policy.
//!
//! # Responsibilities
//! - Turn `CorsConfig` into an immutable `CorsPolicy`
//! - Build the `CorsLayer` that wraps the whole dispatch
//! - Keep plain `OPTIONS` requests away from the preflight short-circuit
//!
//! # Design Decisions
//! - Disallowed origins are not rejected; their responses simply carry no
//!   permissive headers and the browser enforces the policy
//! - Only `OPTIONS` carrying both `Origin` and `Access-Control-Request-Method`
//!   is a preflight; it is answered by the layer and never reaches routing
//! - "All methods/headers" with credentials mirrors the request, since
//!   browsers refuse a literal `*` alongside credentials

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
    Router,
};
use tower::{service_fn, Layer, ServiceExt};
use tower_http::cors::{AllowCredentials, AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use crate::config::CorsConfig;

/// Either everything, or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowList<T> {
    All,
    Only(Vec<T>),
}

impl<T> AllowList<T> {
    fn parse<F>(entries: &[String], what: &'static str, parse: F) -> Self
    where
        F: Fn(&str) -> Option<T>,
    {
        if entries.iter().any(|e| e == "*") {
            return AllowList::All;
        }
        let items = entries
            .iter()
            .filter_map(|entry| {
                let item = parse(entry.as_str());
                if item.is_none() {
                    tracing::warn!(entry = %entry, kind = what, "Ignoring invalid CORS entry");
                }
                item
            })
            .collect();
        AllowList::Only(items)
    }
}

/// Read-only cross-origin rules for the process lifetime.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    pub origins: AllowList<HeaderValue>,
    pub methods: AllowList<Method>,
    pub headers: AllowList<HeaderName>,
    pub allow_credentials: bool,
    pub max_age: Option<Duration>,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Self {
        let mut origins = AllowList::parse(&config.allowed_origins, "origin", |o| {
            HeaderValue::from_str(o).ok()
        });
        if config.allow_credentials && origins == AllowList::All {
            tracing::error!(
                origins = ?config.allowed_origins,
                "Invalid CORS config: '*' cannot be combined with credentials; allowing no origins"
            );
            origins = AllowList::Only(Vec::new());
        }

        Self {
            origins,
            methods: AllowList::parse(&config.allowed_methods, "method", |m| {
                Method::from_bytes(m.as_bytes()).ok()
            }),
            headers: AllowList::parse(&config.allowed_headers, "header", |h| {
                HeaderName::from_bytes(h.as_bytes()).ok()
            }),
            allow_credentials: config.allow_credentials,
            max_age: config.max_age_secs.map(Duration::from_secs),
        }
    }

    pub fn allows_origin(&self, origin: &HeaderValue) -> bool {
        match &self.origins {
            AllowList::All => true,
            AllowList::Only(list) => list.contains(origin),
        }
    }

    /// Build the tower layer enforcing this policy.
    pub fn layer(&self) -> CorsLayer {
        let mut cors = CorsLayer::new();

        cors = match &self.origins {
            AllowList::All => cors.allow_origin(Any),
            AllowList::Only(list) => cors.allow_origin(AllowOrigin::list(list.clone())),
        };

        cors = match &self.methods {
            AllowList::All if self.allow_credentials => {
                cors.allow_methods(AllowMethods::mirror_request())
            }
            AllowList::All => cors.allow_methods(Any),
            AllowList::Only(list) => cors.allow_methods(list.clone()),
        };

        cors = match &self.headers {
            AllowList::All if self.allow_credentials => {
                cors.allow_headers(AllowHeaders::mirror_request())
            }
            AllowList::All => cors.allow_headers(Any),
            AllowList::Only(list) => cors.allow_headers(list.clone()),
        };

        if self.allow_credentials {
            let policy = self.clone();
            cors = cors.allow_credentials(AllowCredentials::predicate(move |origin, _| {
                policy.allows_origin(origin)
            }));
        }

        if let Some(max_age) = self.max_age {
            cors = cors.max_age(max_age);
        }

        cors
    }
}

/// Whether `request` is a CORS preflight rather than a plain `OPTIONS`.
pub fn is_preflight<B>(request: &Request<B>) -> bool {
    request.method() == Method::OPTIONS
        && request.headers().contains_key(header::ORIGIN)
        && request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

/// State for [`gate_preflight`]: the stack below the `CorsLayer`, and the
/// layer itself.
///
/// `CorsLayer` answers every `OPTIONS` on its own. Plain `OPTIONS` requests
/// are sent straight to `inner` and then get the headers a simple request
/// from the same origin would get.
#[derive(Clone)]
pub struct PreflightGate {
    inner: Router,
    cors: CorsLayer,
}

impl PreflightGate {
    pub fn new(inner: Router, policy: &CorsPolicy) -> Self {
        Self {
            inner,
            cors: policy.layer(),
        }
    }
}

/// Middleware placed outside the `CorsLayer`.
pub async fn gate_preflight(
    State(gate): State<PreflightGate>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::OPTIONS || is_preflight(&request) {
        return next.run(request).await;
    }

    let PreflightGate { inner, cors } = gate;
    let origin = request.headers().get(header::ORIGIN).cloned();
    let mut response = match inner.oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    if let Some(origin) = origin {
        let headers = simple_request_headers(cors, origin).await;
        response.headers_mut().extend(headers);
    }
    response
}

/// The headers `cors` adds to a simple request from `origin`.
async fn simple_request_headers(cors: CorsLayer, origin: HeaderValue) -> HeaderMap {
    let request = match Request::builder()
        .header(header::ORIGIN, origin)
        .body(Body::empty())
    {
        Ok(request) => request,
        Err(_) => return HeaderMap::new(),
    };
    let empty = service_fn(|_: Request| async { Ok::<_, Infallible>(Response::new(Body::empty())) });

    match cors.layer(empty).oneshot(request).await {
        Ok(response) => response.into_parts().0.headers,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = CorsPolicy::from_config(&CorsConfig::default());

        assert_eq!(
            policy.origins,
            AllowList::Only(vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ])
        );
        assert_eq!(policy.methods, AllowList::All);
        assert_eq!(policy.headers, AllowList::All);
        assert!(policy.allow_credentials);
        assert!(policy.allows_origin(&HeaderValue::from_static("http://localhost:3000")));
        assert!(!policy.allows_origin(&HeaderValue::from_static("http://evil.example")));
    }

    #[test]
    fn test_wildcard_origin_with_credentials_allows_nothing() {
        let config = CorsConfig {
            allowed_origins: vec!["*".into()],
            ..CorsConfig::default()
        };
        let policy = CorsPolicy::from_config(&config);

        assert_eq!(policy.origins, AllowList::Only(vec![]));
        let _ = policy.layer();
    }

    #[test]
    fn test_explicit_lists() {
        let config = CorsConfig {
            allowed_origins: vec!["*".into()],
            allowed_methods: vec!["GET".into(), "POST".into()],
            allowed_headers: vec!["content-type".into()],
            allow_credentials: false,
            max_age_secs: Some(600),
        };
        let policy = CorsPolicy::from_config(&config);

        assert_eq!(policy.origins, AllowList::All);
        assert_eq!(policy.methods, AllowList::Only(vec![Method::GET, Method::POST]));
        assert_eq!(
            policy.headers,
            AllowList::Only(vec![HeaderName::from_static("content-type")])
        );
        assert_eq!(policy.max_age, Some(Duration::from_secs(600)));
        let _ = policy.layer();
    }

    #[test]
    fn test_preflight_needs_origin_and_request_method() {
        let request = |headers: &[(HeaderName, &'static str)]| {
            let mut builder = Request::builder().method(Method::OPTIONS).uri("/");
            for (name, value) in headers {
                builder = builder.header(name, *value);
            }
            builder.body(Body::empty()).unwrap()
        };

        assert!(!is_preflight(&request(&[])));
        assert!(!is_preflight(&request(&[(header::ORIGIN, "http://localhost:3000")])));
        assert!(!is_preflight(&request(&[(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")])));
        assert!(is_preflight(&request(&[
            (header::ORIGIN, "http://localhost:3000"),
            (header::ACCESS_CONTROL_REQUEST_METHOD, "POST"),
        ])));

        let get = Request::builder()
            .uri("/")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        assert!(!is_preflight(&get));
    }

    #[tokio::test]
    async fn test_simple_request_headers_follow_policy() {
        let policy = CorsPolicy::from_config(&CorsConfig::default());

        let allowed =
            simple_request_headers(policy.layer(), HeaderValue::from_static("http://localhost:3000"))
                .await;
        assert_eq!(allowed[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
        assert_eq!(allowed[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

        let denied =
            simple_request_headers(policy.layer(), HeaderValue::from_static("http://evil.example"))
                .await;
        assert!(denied.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
