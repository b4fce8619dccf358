use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use core_config::AppInfo;
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

/// Aggregated readiness result, one entry per dependency.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub checks: BTreeMap<String, &'static str>,
}

/// A boxed future for health checks with a string error
pub type HealthCheckFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// Runs health checks concurrently; 200 when all pass, 503 otherwise.
///
/// ```ignore
/// let checks: Vec<(&str, HealthCheckFuture)> = vec![
///     ("database", Box::pin(async { check_health(&db).await.map_err(|e| e.to_string()) })),
/// ];
/// run_health_checks(checks).await
/// ```
pub async fn run_health_checks(checks: Vec<(&str, HealthCheckFuture<'_>)>) -> Response {
    let names: Vec<_> = checks.iter().map(|(name, _)| *name).collect();
    let futures: Vec<_> = checks.into_iter().map(|(_, check)| check).collect();
    let results = join_all(futures).await;

    let mut all_healthy = true;
    let mut statuses = BTreeMap::new();

    for (name, result) in names.into_iter().zip(results) {
        match result {
            Ok(()) => {
                statuses.insert(name.to_string(), "connected");
            }
            Err(e) => {
                tracing::error!(check = name, error = %e, "Readiness check failed");
                statuses.insert(name.to_string(), "disconnected");
                all_healthy = false;
            }
        }
    }

    let body = ReadyResponse {
        status: if all_healthy { "ready" } else { "not ready" },
        checks: statuses,
    };
    let status = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(body)).into_response()
}

/// Liveness handler: 200 whenever the process is serving.
pub async fn health_handler(State(app): State<AppInfo>) -> Response {
    let response = HealthResponse {
        status: "healthy",
        name: app.name,
        version: app.version,
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Router exposing `GET /health`.
pub fn health_router(app_info: AppInfo) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(app_info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_router_reports_app_info() {
        let app = health_router(AppInfo {
            name: "notes_api",
            version: "1.2.3",
        });

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["name"], "notes_api");
    }

    #[tokio::test]
    async fn test_run_health_checks_all_ok() {
        let checks: Vec<(&str, HealthCheckFuture)> = vec![
            ("database", Box::pin(async { Ok(()) })),
            ("qdrant", Box::pin(async { Ok(()) })),
        ];

        let response = run_health_checks(checks).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["checks"]["qdrant"], "connected");
    }

    #[tokio::test]
    async fn test_run_health_checks_one_failing() {
        let checks: Vec<(&str, HealthCheckFuture)> = vec![
            ("database", Box::pin(async { Ok(()) })),
            ("qdrant", Box::pin(async { Err("timeout".to_string()) })),
        ];

        let response = run_health_checks(checks).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["status"], "not ready");
        assert_eq!(body["checks"]["database"], "connected");
        assert_eq!(body["checks"]["qdrant"], "disconnected");
    }
}
