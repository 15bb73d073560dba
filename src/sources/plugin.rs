use std::time::Duration;

use async_trait::async_trait;

use crate::common::{errors::RadioError, types::AnyResult, types::VideoId};

/// One strategy for turning a video identifier into a directly playable
/// stream URL.
///
/// Strategies are tried in registration order by the
/// [`SourceManager`](super::SourceManager); each call is bounded by
/// [`StreamProvider::timeout`].
#[async_trait]
pub trait StreamProvider: Send + Sync {
    /// Label used in logs, e.g. `yt-dlp` or `piped:pipedapi.kavin.rocks`.
    fn name(&self) -> &str;

    fn timeout(&self) -> Duration;

    async fn stream_url(&self, video_id: &VideoId) -> AnyResult<String>;
}

pub type BoxedProvider = Box<dyn StreamProvider>;

/// What the scheduler needs from the resolution layer: a reference in, a
/// playable URL out.
#[async_trait]
pub trait TrackResolver: Send + Sync {
    async fn resolve(&self, reference: &str) -> Result<String, RadioError>;
}
