use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::not_found;
use crate::http::{create_cors_layer, security_headers};
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

/// Assembles the public router around the domain routes.
///
/// - OpenAPI JSON at `/api-docs/openapi.json`, Swagger UI at `/swagger-ui`,
///   Scalar at `/scalar`
/// - `apis` nested under `/api`
/// - JSON 404 fallback
/// - request tracing, security headers, compression
/// - CORS when `server_config.cors_allowed_origins` is non-empty
///
/// Health endpoints are merged by the app, outside `/api`.
pub fn create_router<T>(apis: Router, server_config: &ServerConfig) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers));

    let router = if server_config.cors_allowed_origins.is_empty() {
        info!("CORS disabled (CORS_ALLOWED_ORIGIN not set)");
        router
    } else {
        info!(
            origins = ?server_config.cors_allowed_origins,
            "CORS configured"
        );
        router.layer(create_cors_layer(&server_config.cors_allowed_origins)?)
    };

    Ok(router.layer(CompressionLayer::new()))
}

/// Serves `router` until SIGINT/SIGTERM, drains in-flight requests, then runs
/// `cleanup` bounded by `shutdown_timeout`.
///
/// ```ignore
/// let cleanup = async move {
///     db.close().await.ok();
/// };
///
/// create_production_app(router, &config.server, Duration::from_secs(30), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let coordinator = ShutdownCoordinator::new();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let signal = coordinator.clone();
    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { signal.wait().await })
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed successfully"),
        Err(_) => tracing::warn!(
            "Cleanup exceeded timeout of {:?}, forcing shutdown",
            shutdown_timeout
        ),
    }

    serve_result
}
