use std::{future::Future, sync::Arc};

use axum::{
    Router,
    http::{StatusCode, Uri},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    common::errors::ApiError,
    server::AppState,
    transport::{
        middleware::add_response_headers,
        routes::{info, search, station, stream},
    },
};

pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/search", get(search::search))
        .route("/play", post(station::play))
        .route("/stop", post(station::stop))
        .route("/status", get(station::status))
        .route("/playlist", get(station::playlist))
        .route("/radio/url", get(station::radio_url))
        .route("/stream", get(stream::stream));

    Router::new()
        .route("/", get(info::root))
        .route("/health", get(info::health))
        .route("/version", get(info::get_version))
        .nest("/api", api_routes)
        .fallback(not_found)
        .layer(middleware::from_fn(add_response_headers))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Graceful-shutdown trigger for `axum::serve`. Once `signal` fires the
/// station is shut down, which ends every open `/api/stream` body so the
/// server can drain its connections.
pub async fn shutdown_on<F>(state: Arc<AppState>, signal: F)
where
    F: Future<Output = ()> + Send,
{
    signal.await;
    state.station.shutdown();
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not Found", uri.path())
}
