//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: &'static str,
    pub database: &'static str,
}

/// `GET /health`
///
/// `503` when the SQLite pool cannot answer a trivial query.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match state.database() {
        None => "unused",
        Some(db) if db.health_check().await => "connected",
        Some(_) => "unavailable",
    };

    let (code, status) = if database == "unavailable" {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    } else {
        (StatusCode::OK, "ok")
    };

    (
        code,
        Json(HealthResponse {
            status,
            storage: state.storage().as_str(),
            database,
        }),
    )
}
