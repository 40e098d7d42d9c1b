use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{data, edge, health, stats};
use crate::error::AppError;
use crate::AppState;

async fn fallback() -> AppError {
    AppError::UnknownRoute
}

pub fn build(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    let api = Router::new()
        .route("/data", get(data::list))
        .route("/data/:id", get(data::get))
        .route("/stats", get(stats::stats));

    let functions = Router::new()
        .route("/api", get(edge::page))
        .route("/get-data", get(edge::all));

    let router = Router::new()
        .nest("/api", api)
        .nest("/functions/v1", functions)
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .fallback(fallback);

    router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(timeout))
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive()),
    )
}
