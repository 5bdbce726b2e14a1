use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

/// Liveness/readiness probe. Reports the storage backend and pings the
/// database when one is configured.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy"),
        (status = 503, description = "Database unreachable")
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match &state.db {
        Some(db) => match db.ping().await {
            Ok(()) => (
                StatusCode::OK,
                Json(json!({ "status": "ok", "storage": "sql" })),
            ),
            Err(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "storage": "sql", "error": e.to_string() })),
            ),
        },
        None => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "storage": "in-memory" })),
        ),
    }
}
