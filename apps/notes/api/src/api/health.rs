//! Readiness check against the database and, when enabled, Qdrant.

use crate::state::AppState;
use axum::{extract::State, response::Response};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};

pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let mut checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "database",
        Box::pin(async {
            database::postgres::check_health(&state.db)
                .await
                .map_err(|e| e.to_string())
        }),
    )];

    if let Some(index) = &state.index {
        checks.push((
            "qdrant",
            Box::pin(async move {
                index
                    .health_check()
                    .await
                    .map_err(|e| format!("Qdrant health check failed: {}", e))
            }),
        ));
    }

    run_health_checks(checks).await
}
