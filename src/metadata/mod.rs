pub mod youtube;

use async_trait::async_trait;
use serde::Serialize;

use crate::common::{errors::RadioError, types::VideoId};

pub use youtube::YouTubeDataApi;

/// Display metadata for a single video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    /// Seconds, 0 when unknown.
    pub duration: u64,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: VideoId,
    pub title: String,
    pub url: String,
    pub duration: u64,
    pub thumbnail: Option<String>,
    pub artist: String,
    pub source: &'static str,
}

/// Video lookup and search. Optional: without one, tracks are queued by bare
/// reference and search is unavailable.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// `Ok(None)` when the video does not exist.
    async fn lookup(&self, video_id: &VideoId) -> Result<Option<TrackMetadata>, RadioError>;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, RadioError>;
}
