//! # Axum Helpers
//!
//! Shared building blocks for the blog HTTP services.
//!
//! - **[`server`]**: router assembly with API docs, health/readiness, graceful shutdown
//! - **[`http`]**: CORS and security-header middleware
//! - **[`errors`]**: structured JSON error responses with stable error codes
//! - **[`extractors`]**: `ValidatedJson`, `ValidatedQuery`, `UuidPath`
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_app, create_router};
//! use core_config::{api::ApiConfig, docs::DocsConfig, server::ServerConfig, Environment};
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! let api_routes = Router::new();
//! let router = create_router::<ApiDoc>(
//!     api_routes,
//!     &ApiConfig::default(),
//!     &DocsConfig::default(),
//!     &ServerConfig::default(),
//!     &Environment::Development,
//! )?;
//! create_app(router, &ServerConfig::default()).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_app, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{create_cors_layer, create_permissive_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedJson, ValidatedQuery};
