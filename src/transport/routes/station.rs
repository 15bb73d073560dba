use std::sync::Arc;

use axum::{Form, extract::State, response::Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    common::errors::ApiError,
    player::{PlayerStatus, PlaylistSnapshot, StationStatus, Track},
    server::AppState,
};

#[derive(Debug, Deserialize)]
pub struct PlayForm {
    pub video_url: String,
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub status: &'static str,
    pub track: Track,
    pub position: usize,
    pub radio_url: String,
    pub listeners: usize,
    pub message: String,
}

/// POST /api/play
pub async fn play(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PlayForm>,
) -> Result<Json<PlayResponse>, ApiError> {
    info!("POST /api/play: {}", form.video_url);
    let receipt = state
        .station
        .enqueue(&form.video_url)
        .await
        .map_err(|e| ApiError::from_radio(&e, "/api/play"))?;

    Ok(Json(PlayResponse {
        status: "added_to_playlist",
        message: format!(
            "Added to playlist: {} by {}",
            receipt.track.title, receipt.track.artist
        ),
        track: receipt.track,
        position: receipt.position,
        radio_url: state.radio_url(),
        listeners: state.station.listener_count(),
    }))
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub listeners: usize,
    pub streaming_loop: &'static str,
}

/// POST /api/stop
pub async fn stop(State(state): State<Arc<AppState>>) -> Json<StopResponse> {
    info!("POST /api/stop");
    state.station.stop();
    Json(StopResponse {
        status: "stopped",
        message: "Current playback stopped",
        listeners: state.station.listener_count(),
        streaming_loop: if state.station.scheduler_running() {
            "active"
        } else {
            "inactive"
        },
    })
}

/// GET /api/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StationStatus> {
    tracing::debug!("GET /api/status");
    Json(state.station.status())
}

/// GET /api/playlist
pub async fn playlist(State(state): State<Arc<AppState>>) -> Json<PlaylistSnapshot> {
    tracing::debug!("GET /api/playlist");
    Json(state.station.queue())
}

#[derive(Debug, Serialize)]
pub struct RadioUrlResponse {
    pub radio_url: String,
    pub status: PlayerStatus,
    pub current_track: String,
    pub artist: String,
    pub listeners: usize,
    pub live_broadcast: bool,
    pub continuous_playback: bool,
}

/// GET /api/radio/url
pub async fn radio_url(State(state): State<Arc<AppState>>) -> Json<RadioUrlResponse> {
    tracing::debug!("GET /api/radio/url");
    let status = state.station.status();
    let (current_track, artist) = match status.current_track {
        Some(track) => (track.title, track.artist),
        None => ("No track playing".to_string(), "None".to_string()),
    };

    Json(RadioUrlResponse {
        radio_url: state.radio_url(),
        status: status.status,
        current_track,
        artist,
        listeners: status.listeners,
        live_broadcast: true,
        continuous_playback: true,
    })
}
