use std::{sync::Arc, time::Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    audio::transcoder::FfmpegTranscoder,
    common::types::AnyResult,
    configs::Config,
    metadata::{MetadataProvider, YouTubeDataApi},
    player::Station,
    sources::{SourceManager, ytdlp::YtDlpProvider},
};

/// Top-level application state shared by every route.
pub struct AppState {
    pub config: Config,
    pub station: Arc<Station>,
    pub source_manager: Arc<SourceManager>,
    pub metadata: Option<Arc<dyn MetadataProvider>>,
    pub ytdlp_version: Option<String>,
    pub started_at: Instant,
}

/// Optional capabilities, reported by `/` and `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct Features {
    pub yt_dlp: bool,
    pub youtube_api: bool,
    pub live_broadcast: bool,
    pub continuous_playback: bool,
}

impl AppState {
    pub async fn build(config: Config) -> AnyResult<Arc<Self>> {
        let source_manager = Arc::new(SourceManager::new(&config.sources)?);

        let metadata: Option<Arc<dyn MetadataProvider>> = match YouTubeDataApi::new(&config.metadata)? {
            Some(api) => {
                info!("YouTube Data API enabled");
                Some(Arc::new(api))
            }
            None => {
                warn!("No YouTube API key configured, search is disabled");
                None
            }
        };

        let ytdlp_version = if config.sources.ytdlp.enabled {
            let version = YtDlpProvider::probe(&config.sources.ytdlp.path).await;
            match &version {
                Some(v) => info!("yt-dlp available: {}", v),
                None => warn!("yt-dlp not found at '{}'", config.sources.ytdlp.path),
            }
            version
        } else {
            None
        };

        let station = Station::new(
            config.player.clone(),
            source_manager.clone(),
            Arc::new(FfmpegTranscoder::new(config.stream.clone())),
            metadata.clone(),
        );

        Ok(Arc::new(Self {
            config,
            station,
            source_manager,
            metadata,
            ytdlp_version,
            started_at: Instant::now(),
        }))
    }

    pub fn features(&self) -> Features {
        Features {
            yt_dlp: self.ytdlp_version.is_some(),
            youtube_api: self.metadata.is_some(),
            live_broadcast: true,
            continuous_playback: true,
        }
    }

    pub fn radio_url(&self) -> String {
        self.config.server.radio_url()
    }

    /// Queues the configured startup tracks, skipping any that fail.
    pub async fn seed_default_tracks(&self) {
        for reference in &self.config.station.default_tracks {
            match self.station.enqueue(reference).await {
                Ok(receipt) => info!("Added default song: {}", receipt.track.title),
                Err(e) => warn!("Skipping default song {}: {}", reference, e),
            }
        }
    }
}
