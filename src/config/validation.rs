//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject CORS settings browsers would refuse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, Method};
use thiserror::Error;
use url::Url;

use crate::config::schema::{CorsConfig, GatewayConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.host must not be empty")]
    EmptyHost,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("cors origin '{0}' is not a serialized http(s) origin")]
    InvalidOrigin(String),

    #[error("cors origin '*' cannot be combined with allow_credentials")]
    WildcardOriginWithCredentials,

    #[error("cors method '{0}' is not a valid HTTP method")]
    InvalidMethod(String),

    #[error("cors header '{0}' is not a valid header name")]
    InvalidHeader(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("observability.log_level '{0}' is not a valid filter directive")]
    InvalidLogLevel(String),
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    validate_cors(&config.cors, &mut errors);

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if tracing_subscriber::EnvFilter::try_new(&observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_cors(cors: &CorsConfig, errors: &mut Vec<ValidationError>) {
    for origin in &cors.allowed_origins {
        if origin == "*" {
            if cors.allow_credentials {
                errors.push(ValidationError::WildcardOriginWithCredentials);
            }
            continue;
        }
        if !is_serialized_origin(origin) {
            errors.push(ValidationError::InvalidOrigin(origin.clone()));
        }
    }

    for method in &cors.allowed_methods {
        if method != "*" && Method::from_bytes(method.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod(method.clone()));
        }
    }

    for header in &cors.allowed_headers {
        if header != "*" && HeaderName::from_bytes(header.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeader(header.clone()));
        }
    }
}

/// Browsers send `Origin` as `scheme://host[:port]`; anything else never matches.
fn is_serialized_origin(origin: &str) -> bool {
    match Url::parse(origin) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.origin().ascii_serialization() == origin
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_origins_must_be_bare() {
        let mut config = GatewayConfig::default();
        config.cors.allowed_origins = vec![
            "http://localhost:3000/".into(),
            "localhost:3000".into(),
            "ftp://files.example.com".into(),
            "https://tools.example.com".into(),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidOrigin("http://localhost:3000/".into()),
                ValidationError::InvalidOrigin("localhost:3000".into()),
                ValidationError::InvalidOrigin("ftp://files.example.com".into()),
            ]
        );
    }

    #[test]
    fn test_wildcard_origin_allowed_without_credentials() {
        let mut config = GatewayConfig::default();
        config.cors.allowed_origins = vec!["*".into()];
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::WildcardOriginWithCredentials])
        );

        config.cors.allow_credentials = false;
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.host = " ".into();
        config.timeouts.request_secs = 0;
        config.cors.allowed_methods = vec!["GET".into(), "BAD METHOD".into()];
        config.cors.allowed_headers = vec!["x-ok".into(), "bad header".into()];
        config.observability.metrics_address = "not-an-addr".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::EmptyHost));
        assert!(errors.contains(&ValidationError::ZeroRequestTimeout));
        assert!(errors.contains(&ValidationError::InvalidMethod("BAD METHOD".into())));
        assert!(errors.contains(&ValidationError::InvalidHeader("bad header".into())));
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_enabled = false;
        config.observability.metrics_address = "nope".into();
        assert_eq!(validate_config(&config), Ok(()));
    }
}
