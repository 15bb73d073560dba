use std::sync::Arc;

use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::{
    player::PlayerStatus,
    server::{AppState, Features},
};

#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub branch: &'static str,
    pub commit: &'static str,
    pub build_time: u64,
}

impl BuildInfo {
    fn current() -> Self {
        Self {
            branch: option_env!("GIT_BRANCH").unwrap_or("unknown"),
            commit: option_env!("GIT_COMMIT").unwrap_or("unknown"),
            build_time: option_env!("BUILD_TIME")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub status: &'static str,
    pub version: &'static str,
    pub listeners: usize,
    pub streaming: bool,
    pub current_track: Option<String>,
    pub playlist_size: usize,
    pub features: Features,
    pub build: BuildInfo,
}

/// GET /
pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    tracing::debug!("GET /");
    let status = state.station.status();
    Json(RootResponse {
        message: format!("{} API (24/7 Live Broadcasting)", state.config.station.name),
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        listeners: status.listeners,
        streaming: status.is_streaming,
        current_track: status.current_track.map(|t| t.title),
        playlist_size: status.playlist_size,
        features: state.features(),
        build: BuildInfo::current(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub player_status: PlayerStatus,
    pub listeners: usize,
    pub buffer_size: usize,
    pub buffer_capacity: usize,
    pub playlist_size: usize,
    pub uptime_secs: u64,
    pub stream_providers: Vec<String>,
    pub features: Features,
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    tracing::debug!("GET /health");
    let status = state.station.status();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        player_status: status.status,
        listeners: status.listeners,
        buffer_size: status.buffer_size,
        buffer_capacity: state.station.buffer_capacity(),
        playlist_size: status.playlist_size,
        uptime_secs: state.started_at.elapsed().as_secs(),
        stream_providers: state.source_manager.provider_names(),
        features: state.features(),
    })
}

/// GET /version
pub async fn get_version() -> String {
    tracing::debug!("GET /version");
    env!("CARGO_PKG_VERSION").to_string()
}
