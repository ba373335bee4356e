use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use sqlx::sqlite::SqlitePool;

use crate::db;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    database: String,
    timestamp: i64,
}

// GET /health - Liveness plus a store probe
pub async fn health_check(State(pool): State<SqlitePool>) -> (StatusCode, Json<HealthResponse>) {
    let (status, database) = match db::ping(&pool).await {
        Ok(()) => (StatusCode::OK, "ok".to_string()),
        Err(e) => {
            tracing::error!("Health check database probe failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    };

    let response = HealthResponse {
        status: if status.is_success() { "ok" } else { "degraded" }.to_string(),
        database,
        timestamp: chrono::Utc::now().timestamp(),
    };

    (status, Json(response))
}
