use axum::http::{HeaderValue, Method};
use core_config::{ConfigError, Environment};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

const CORS_ENV: &str = "CORS_ALLOWED_ORIGIN";

/// CORS layer restricted to `allowed_origins`.
///
/// Allows the methods the REST API uses, JSON content headers, and caches
/// preflight responses for an hour.
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// Permissive CORS for local development. Never use in production.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Builds the CORS layer from `CORS_ALLOWED_ORIGIN` (comma-separated).
///
/// Unset is allowed in development (permissive) and an error in production.
pub fn cors_from_env(environment: &Environment) -> Result<CorsLayer, ConfigError> {
    let Ok(raw) = std::env::var(CORS_ENV) else {
        if environment.is_production() {
            return Err(ConfigError::MissingEnvVar(CORS_ENV.to_string()));
        }
        warn!("{} not set, using permissive CORS", CORS_ENV);
        return Ok(create_permissive_cors_layer());
    };

    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ConfigError::ParseError {
            key: CORS_ENV.to_string(),
            details: e.to_string(),
        })?;

    if origins.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: CORS_ENV.to_string(),
            details: "no origins listed".to_string(),
        });
    }

    info!(origins = %raw, "CORS configured");
    Ok(create_cors_layer(origins))
}
