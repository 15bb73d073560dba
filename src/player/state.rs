use serde::{Deserialize, Serialize};

use crate::common::types::VideoId;

/// A queued unit of audio with its display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: VideoId,
    pub title: String,
    /// Source reference handed to the resolver.
    pub url: String,
    pub artist: String,
    /// Duration in seconds, 0 when unknown.
    pub duration: u64,
    pub thumbnail: Option<String>,
}

impl Track {
    /// Track built from nothing but its id, used when no metadata lookup is
    /// configured.
    pub fn from_reference(id: VideoId, url: impl Into<String>) -> Self {
        Self {
            title: id.to_string(),
            id,
            url: url.into(),
            artist: "Unknown Artist".to_string(),
            duration: 0,
            thumbnail: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Stopped,
    Playing,
}

/// Process-wide playback state. Only the scheduler, the ingest pipeline and
/// `Station::stop` write it.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub current: Option<Track>,
    pub status: PlayerStatus,
    pub is_ingesting: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current: None,
            status: PlayerStatus::Stopped,
            is_ingesting: false,
        }
    }
}

/// Reply of the `status` boundary operation.
#[derive(Debug, Clone, Serialize)]
pub struct StationStatus {
    pub status: PlayerStatus,
    pub current_track: Option<Track>,
    pub stream_active: bool,
    pub listeners: usize,
    pub buffer_size: usize,
    pub is_streaming: bool,
    pub playlist_size: usize,
    pub continuous_mode: bool,
}

/// Reply of the `queue` boundary operation.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistSnapshot {
    pub current: Option<Track>,
    pub queue: Vec<Track>,
    pub total: usize,
}

/// What `enqueue` hands back: the queued track and its 1-based position.
#[derive(Debug, Clone, Serialize)]
pub struct EnqueueReceipt {
    pub track: Track,
    pub position: usize,
}
