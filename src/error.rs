use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while opening the store at startup. Both are fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to database: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("failed to create matches table: {0}")]
    Schema(#[source] sqlx::Error),
}

/// Per-request failures, rendered as a JSON error body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Match not found")]
    NotFound,
    #[error("Resource not found")]
    RouteNotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("{0}")]
    BadRequest(String),
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        // Counter columns carry CHECK bounds; hitting one is a client error.
        let check_violation = err
            .as_database_error()
            .is_some_and(|db_err| db_err.is_check_violation());

        if check_violation {
            ApiError::BadRequest("Counter value out of range".to_string())
        } else {
            ApiError::DatabaseError(err)
        }
    }
}

/// Fallback for paths that match no route.
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::DatabaseError(err) => {
                tracing::error!("Database error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}
