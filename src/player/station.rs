use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{
    queue::PlaylistQueue,
    scheduler,
    session::{BroadcastSession, ListenerInfo},
    state::{EnqueueReceipt, PlayerState, PlayerStatus, PlaylistSnapshot, StationStatus, Track},
};
use crate::{
    audio::{buffer::LiveBuffer, ingest::IngestPipeline, transcoder::Transcoder},
    common::{errors::RadioError, types::ListenerId},
    configs::PlayerConfig,
    metadata::MetadataProvider,
    sources::{TrackResolver, extract_video_id},
};

/// The broadcast engine: one shared timeline, the queue feeding it and the
/// listeners reading from it.
pub struct Station {
    config: PlayerConfig,
    buffer: LiveBuffer,
    state: RwLock<PlayerState>,
    queue: PlaylistQueue,
    listeners: DashMap<ListenerId, ListenerInfo>,
    resolver: Arc<dyn TrackResolver>,
    metadata: Option<Arc<dyn MetadataProvider>>,
    ingest: IngestPipeline,
    /// Token of the track currently being played; `stop` cancels it.
    track_cancel: Mutex<CancellationToken>,
    scheduler: Mutex<Option<JoinHandle<()>>>,
}

impl Station {
    pub fn new(
        config: PlayerConfig,
        resolver: Arc<dyn TrackResolver>,
        transcoder: Arc<dyn Transcoder>,
        metadata: Option<Arc<dyn MetadataProvider>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            buffer: LiveBuffer::new(config.buffer_capacity),
            ingest: IngestPipeline::new(transcoder, &config),
            state: RwLock::new(PlayerState::default()),
            queue: PlaylistQueue::new(),
            listeners: DashMap::new(),
            resolver,
            metadata,
            track_cancel: Mutex::new(CancellationToken::new()),
            scheduler: Mutex::new(None),
            config,
        })
    }

    /// Validates `reference`, looks up its metadata when a provider is
    /// configured, queues the track and makes sure the scheduler runs.
    pub async fn enqueue(self: &Arc<Self>, reference: &str) -> Result<EnqueueReceipt, RadioError> {
        let video_id = extract_video_id(reference)
            .ok_or_else(|| RadioError::InvalidReference(reference.to_string()))?;

        let track = match &self.metadata {
            Some(metadata) => {
                let meta = metadata
                    .lookup(&video_id)
                    .await?
                    .ok_or_else(|| RadioError::TrackNotFound(video_id.to_string()))?;
                Track {
                    id: video_id,
                    title: meta.title,
                    url: reference.trim().to_string(),
                    artist: meta.artist,
                    duration: meta.duration,
                    thumbnail: meta.thumbnail,
                }
            }
            None => Track::from_reference(video_id, reference.trim()),
        };

        Ok(self.enqueue_track(track))
    }

    pub fn enqueue_track(self: &Arc<Self>, track: Track) -> EnqueueReceipt {
        info!("Adding to playlist: {} ({})", track.title, track.id);
        let position = self.queue.push(track.clone());
        self.ensure_scheduler();
        EnqueueReceipt { track, position }
    }

    /// Ends the current track. The scheduler keeps running and moves on to the
    /// next queued track.
    pub fn stop(&self) {
        {
            // Held across the status write so `begin_track` cannot slip in between.
            let cancel = self.track_cancel.lock();
            cancel.cancel();
            let mut state = self.state.write();
            state.status = PlayerStatus::Stopped;
            state.current = None;
        }
        self.buffer.clear();
        info!("Current track stopped");
    }

    pub fn status(&self) -> StationStatus {
        let state = self.state.read().clone();
        StationStatus {
            stream_active: state.status == PlayerStatus::Playing,
            status: state.status,
            current_track: state.current,
            listeners: self.listener_count(),
            buffer_size: self.buffer.len(),
            is_streaming: state.is_ingesting,
            playlist_size: self.queue.len(),
            continuous_mode: true,
        }
    }

    pub fn queue(&self) -> PlaylistSnapshot {
        let queue = self.queue.snapshot();
        PlaylistSnapshot {
            current: self.current_track(),
            total: queue.len(),
            queue,
        }
    }

    /// Registers a listener positioned just behind the live edge.
    pub fn open_stream(self: &Arc<Self>) -> BroadcastSession {
        BroadcastSession::open(self.clone())
    }

    pub fn current_track(&self) -> Option<Track> {
        self.state.read().current.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.read().status == PlayerStatus::Playing
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn scheduler_running(&self) -> bool {
        self.scheduler
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Stops playback and the scheduler. The transcoder child dies with the
    /// cancelled ingest.
    pub fn shutdown(&self) {
        if let Some(handle) = self.scheduler.lock().take() {
            handle.abort();
        }
        self.stop();
        info!("Station shut down");
    }

    fn ensure_scheduler(self: &Arc<Self>) {
        let mut slot = self.scheduler.lock();
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        if slot.is_some() {
            warn!("Radio loop was not running, restarting it");
        }
        *slot = Some(scheduler::spawn(self.clone()));
    }

    pub(crate) fn buffer(&self) -> &LiveBuffer {
        &self.buffer
    }

    pub(crate) fn ingest_pipeline(&self) -> &IngestPipeline {
        &self.ingest
    }

    pub(crate) fn resolver(&self) -> &dyn TrackResolver {
        self.resolver.as_ref()
    }

    pub(crate) fn playlist(&self) -> &PlaylistQueue {
        &self.queue
    }

    /// Makes `track` current and hands out a fresh cancellation token for it.
    pub(crate) fn begin_track(&self, track: &Track) -> CancellationToken {
        let mut cancel = self.track_cancel.lock();
        let token = CancellationToken::new();
        *cancel = token.clone();

        let mut state = self.state.write();
        state.current = Some(track.clone());
        state.status = PlayerStatus::Playing;
        token
    }

    pub(crate) fn clear_current(&self) {
        self.state.write().current = None;
    }

    pub(crate) fn set_ingesting(&self, ingesting: bool) {
        self.state.write().is_ingesting = ingesting;
    }

    pub(crate) fn register_listener(&self, id: ListenerId) -> usize {
        self.listeners.insert(id, ListenerInfo::now());
        self.listeners.len()
    }

    pub(crate) fn remove_listener(&self, id: &ListenerId) -> usize {
        self.listeners.remove(id);
        self.listeners.len()
    }

    #[cfg(test)]
    pub(crate) fn force_status(&self, status: PlayerStatus) {
        self.state.write().status = status;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        common::types::VideoId,
        metadata::{SearchResult, TrackMetadata},
        testing::{ShellTranscoder, StaticResolver, station_with, wait_until},
    };

    fn idle_station() -> Arc<Station> {
        station_with(
            PlayerConfig::default(),
            Arc::new(StaticResolver::ok()),
            Arc::new(ShellTranscoder::new("sleep 30")),
        )
    }

    struct FakeMetadata;

    #[async_trait]
    impl MetadataProvider for FakeMetadata {
        async fn lookup(&self, video_id: &VideoId) -> Result<Option<TrackMetadata>, RadioError> {
            if video_id.0 == "kJQP7kiw5Fk" {
                Ok(Some(TrackMetadata {
                    title: "Despacito".into(),
                    artist: "Luis Fonsi".into(),
                    duration: 282,
                    thumbnail: None,
                }))
            } else {
                Ok(None)
            }
        }

        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchResult>, RadioError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_fresh_station_status() {
        let station = idle_station();
        let status = station.status();
        assert_eq!(status.status, PlayerStatus::Stopped);
        assert!(status.current_track.is_none());
        assert!(!status.stream_active);
        assert_eq!(status.listeners, 0);
        assert_eq!(status.buffer_size, 0);
        assert!(!status.is_streaming);
        assert_eq!(status.playlist_size, 0);
        assert!(status.continuous_mode);
        assert!(!station.scheduler_running());
    }

    #[tokio::test]
    async fn test_enqueue_rejects_invalid_reference() {
        let station = idle_station();
        let err = station.enqueue("not a video").await.unwrap_err();
        assert!(matches!(err, RadioError::InvalidReference(_)));
        assert_eq!(station.queue().total, 0);
        assert!(!station.scheduler_running());
    }

    #[tokio::test]
    async fn test_enqueue_without_metadata_uses_reference() {
        let station = idle_station();
        let receipt = station
            .enqueue("https://youtu.be/dQw4w9WgXcQ")
            .await
            .unwrap();

        assert_eq!(receipt.position, 1);
        assert_eq!(receipt.track.id.0, "dQw4w9WgXcQ");
        assert_eq!(receipt.track.title, "dQw4w9WgXcQ");
        assert_eq!(receipt.track.url, "https://youtu.be/dQw4w9WgXcQ");
        assert!(station.scheduler_running());
        station.shutdown();
    }

    #[tokio::test]
    async fn test_enqueue_with_metadata() {
        let station = Station::new(
            PlayerConfig::default(),
            Arc::new(StaticResolver::ok()),
            Arc::new(ShellTranscoder::new("sleep 30")),
            Some(Arc::new(FakeMetadata)),
        );

        let receipt = station.enqueue("kJQP7kiw5Fk").await.unwrap();
        assert_eq!(receipt.track.title, "Despacito");
        assert_eq!(receipt.track.artist, "Luis Fonsi");
        assert_eq!(receipt.track.duration, 282);

        let err = station.enqueue("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, RadioError::TrackNotFound(_)));
        station.shutdown();
    }

    #[tokio::test]
    async fn test_enqueue_starts_playing() {
        let station = idle_station();
        station.enqueue("dQw4w9WgXcQ").await.unwrap();

        assert!(
            wait_until(Duration::from_secs(5), || station.is_playing()).await,
            "station never started playing"
        );
        assert_eq!(station.current_track().unwrap().id.0, "dQw4w9WgXcQ");
        assert_eq!(station.queue().total, 0);
        station.shutdown();
    }

    #[tokio::test]
    async fn test_stop_clears_buffer_and_current() {
        let station = idle_station();
        let track = Track::from_reference(VideoId("dQw4w9WgXcQ".into()), "dQw4w9WgXcQ");
        let token = station.begin_track(&track);
        station.buffer().append(bytes::Bytes::from_static(b"abc"));

        station.stop();

        assert!(token.is_cancelled());
        let status = station.status();
        assert_eq!(status.status, PlayerStatus::Stopped);
        assert!(status.current_track.is_none());
        assert_eq!(status.buffer_size, 0);
    }

    #[test]
    fn test_stop_racing_begin_track_leaves_consistent_state() {
        let station = idle_station();
        let track = Track::from_reference(VideoId("dQw4w9WgXcQ".into()), "dQw4w9WgXcQ");

        for _ in 0..500 {
            let token = std::thread::scope(|s| {
                let begin = s.spawn(|| station.begin_track(&track));
                s.spawn(|| station.stop());
                begin.join().unwrap()
            });

            let status = station.status();
            if token.is_cancelled() {
                assert_eq!(status.status, PlayerStatus::Stopped);
                assert!(status.current_track.is_none());
            } else {
                assert_eq!(status.status, PlayerStatus::Playing);
                assert_eq!(status.current_track.as_ref(), Some(&track));
            }
        }
    }

    #[tokio::test]
    async fn test_shutdown_stops_scheduler() {
        let station = idle_station();
        station.enqueue("dQw4w9WgXcQ").await.unwrap();
        assert!(station.scheduler_running());

        station.shutdown();
        assert!(!station.scheduler_running());
        assert!(!station.is_playing());
    }
}
