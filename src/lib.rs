//! HTTP service for football match records backed by a single SQLite table.

use std::future::Future;

use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use sqlx::sqlite::SqlitePool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

/// Build the full application router around an opened pool.
pub fn app(pool: SqlitePool) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Match Records API - v1.0" }))
        .route("/health", get(routes::health::health_check))
        .merge(routes::matches::router())
        .nest("/api", routes::matches::router())
        // Registered after every route so each method router picks it up.
        .method_not_allowed_fallback(error::method_not_allowed)
        .fallback(error::route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // CorsLayer only answers requests that carry an Origin header.
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                ))
                .layer(cors),
        )
        .with_state(pool)
}

/// Serve the app on `listener` until `shutdown` resolves, then let in-flight
/// requests finish.
pub async fn serve<F>(listener: TcpListener, pool: SqlitePool, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(pool))
        .with_graceful_shutdown(shutdown)
        .await
}
