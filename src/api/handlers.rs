use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::core::state::AppState;
use crate::core::{metrics, time::now_utc};
use crate::repositories;
use crate::schemas::{DatabaseHealth, HealthResponse, RootResponse};

pub(crate) async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: state.settings().api().project_name.clone(),
        version: state.settings().api().version.clone(),
    })
}

/// 200 when the database answers, 503 otherwise.
pub(crate) async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let probe_started = Instant::now();
    let database = match repositories::health::database_now(state.db()).await {
        Ok(db_now) => DatabaseHealth {
            status: "healthy",
            latency_ms: Some(probe_started.elapsed().as_millis() as u64),
            clock_skew_ms: Some((now_utc() - db_now).whole_milliseconds() as i64),
            error: None,
        },
        Err(err) => {
            tracing::warn!(error = %err, "Database health probe failed");
            DatabaseHealth {
                status: "unhealthy",
                latency_ms: None,
                clock_skew_ms: None,
                error: Some(err.to_string()),
            }
        }
    };

    let (code, status) = match database.status {
        "healthy" => (StatusCode::OK, "healthy"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };
    (code, Json(HealthResponse { service: "classroom-attempts-api", status, database }))
}

pub(crate) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    if !state.settings().telemetry().prometheus_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    match metrics::render() {
        Some(body) => ([(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
            .into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
