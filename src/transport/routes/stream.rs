use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, header},
    response::{IntoResponse, Response},
};

use crate::{audio::transcoder::FfmpegTranscoder, server::AppState};

/// Response headers for the live body. Station name and genre come from
/// config and are dropped if they are not valid header values.
pub fn stream_headers(state: &AppState) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(FfmpegTranscoder::content_type()),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));

    let icy = [
        ("icy-br", state.config.stream.bitrate_kbps.to_string()),
        ("icy-name", state.config.station.name.clone()),
        ("icy-genre", state.config.station.genre.clone()),
    ];
    for (name, value) in icy {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
    headers
}

/// GET /api/stream
///
/// Every listener gets the same timeline, joined just behind the live edge.
/// The body ends when playback stops; the listener is unregistered when the
/// body is dropped.
pub async fn stream(State(state): State<Arc<AppState>>) -> Response {
    let session = state.station.open_stream();
    tracing::debug!("GET /api/stream: listener {}", session.id().short());

    (stream_headers(&state), Body::from_stream(session.into_stream())).into_response()
}
