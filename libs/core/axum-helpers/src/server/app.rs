use super::shutdown::{ShutdownCoordinator, shutdown_signal};
use crate::errors::handlers::not_found;
use crate::http::{cors_from_env, security_headers};
use axum::{Router, middleware};
use core_config::{
    ConfigError, Environment, api::ApiConfig, docs::DocsConfig, server::ServerConfig,
};
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa::openapi::server::Server;
use utoipa_swagger_ui::SwaggerUi;

/// Starts the server with a plain Ctrl+C / SIGTERM graceful shutdown.
pub async fn create_app(router: Router, server_config: &ServerConfig) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;

    info!("Server starting on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| tracing::error!("Server encountered an error: {:?}", e))
}

/// Wraps the API routes with documentation, prefix nesting and middleware.
///
/// - Swagger UI at `docs.path` serving `docs.json_url`, when `docs.enabled`;
///   the document advertises `api.prefix` as its server base
/// - `apis` nested under `api.prefix`
/// - JSON 404 fallback
/// - tracing, security headers, CORS (see [`cors_from_env`]), compression
///   and the request timeout from `server`
///
/// `apis` must already have its state applied.
///
/// # Errors
/// Fails when the CORS configuration is invalid or, in production, missing.
pub fn create_router<T>(
    apis: Router,
    api: &ApiConfig,
    docs: &DocsConfig,
    server: &ServerConfig,
    environment: &Environment,
) -> Result<Router, ConfigError>
where
    T: OpenApi + 'static,
{
    let cors_layer = cors_from_env(environment)?;

    let mut router = Router::new().nest(&api.prefix, apis);

    if docs.enabled {
        let mut openapi = T::openapi();
        openapi.servers = Some(vec![Server::new(api.prefix.clone())]);
        router = router.merge(SwaggerUi::new(docs.path.clone()).url(docs.json_url.clone(), openapi));
        info!(path = %docs.path, "API documentation enabled");
    }

    let router = router
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer)
        .layer(CompressionLayer::new());

    Ok(router)
}

/// Serves `router` until SIGINT/SIGTERM, then runs `cleanup` bounded by
/// `shutdown_timeout`.
///
/// ```ignore
/// let cleanup = async move {
///     db.close().await.ok();
/// };
/// create_production_app(router, &config, Duration::from_secs(30), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (coordinator, _rx) = ShutdownCoordinator::new();
    let serve_signal = coordinator.clone();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let serve = async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move { serve_signal.wait_for_signal().await })
            .await
    };

    serve_then_cleanup(serve, coordinator, shutdown_timeout, cleanup).await
}

/// Drives `serve` to completion, then runs `cleanup` bounded by
/// `shutdown_timeout`.
///
/// Cleanup starts on the first shutdown signal or as soon as `serve` returns,
/// whichever comes first, so a server that fails still releases its resources.
async fn serve_then_cleanup<S, F>(
    serve: S,
    coordinator: ShutdownCoordinator,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    S: std::future::Future<Output = io::Result<()>>,
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let shutdown_handle = coordinator.clone();
    let cleanup_handle = tokio::spawn(async move {
        shutdown_handle.wait_for_signal().await;

        info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(()) => info!("Cleanup completed successfully"),
            Err(_) => tracing::warn!(
                "Cleanup exceeded timeout of {:?}, forcing shutdown",
                shutdown_timeout
            ),
        }
    });

    let serve_result = serve
        .await
        .inspect_err(|e| tracing::error!("Server encountered an error: {:?}", e));

    // no-op after a signal; releases the cleanup task when serve failed
    coordinator.shutdown();
    cleanup_handle.await.ok();

    serve_result
}
