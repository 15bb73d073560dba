use std::{convert::Infallible, sync::Arc, time::Duration};

use bytes::Bytes;
use futures::Stream;
use tokio::{sync::watch, time::Instant};
use tracing::{debug, info};

use super::station::Station;
use crate::{
    audio::buffer::ReadResult,
    common::{errors::RadioError, types::ListenerId},
};

#[derive(Debug, Clone)]
pub struct ListenerInfo {
    pub connected_at: Instant,
}

impl ListenerInfo {
    pub fn now() -> Self {
        Self {
            connected_at: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Chunk { position: u64, data: Bytes },
    /// The reader fell out of the retention window and jumped back to the
    /// live edge.
    FastForward { from: u64, to: u64 },
    /// Nothing arrived within the silence timeout; carries a zeroed block.
    Silence(Bytes),
}

/// One listener's cursor into the shared timeline.
///
/// Chunks come out in strictly increasing sequence order. The session ends as
/// soon as the station is no longer playing, and dropping it unregisters the
/// listener.
pub struct BroadcastSession {
    id: ListenerId,
    cursor: u64,
    station: Arc<Station>,
    updates: watch::Receiver<u64>,
    lookback: u64,
    silence_timeout: Duration,
    silence: Bytes,
}

impl BroadcastSession {
    pub(crate) fn open(station: Arc<Station>) -> Self {
        let id = ListenerId::generate();
        let config = station.config();
        let lookback = config.lookback_chunks;
        let silence_timeout = config.silence_timeout();
        let silence = Bytes::from(vec![0u8; config.chunk_size]);

        // Subscribe before placing the cursor so no append in between is missed.
        let updates = station.buffer().subscribe();
        let cursor = station.buffer().live_join_position(lookback);
        let total = station.register_listener(id);
        info!("New listener connected: {} (Total: {})", id.short(), total);

        Self {
            id,
            cursor,
            station,
            updates,
            lookback,
            silence_timeout,
            silence,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Next sequence number this session will read.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// `None` once the station stops playing.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            if !self.station.is_playing() {
                return None;
            }

            let buffer = self.station.buffer();
            if self.cursor < buffer.write_position() {
                match buffer.read(self.cursor) {
                    ReadResult::Chunk(data) => {
                        let position = self.cursor;
                        self.cursor += 1;
                        return Some(SessionEvent::Chunk { position, data });
                    }
                    ReadResult::Evicted => {
                        let from = self.cursor;
                        self.cursor = buffer.live_join_position(self.lookback);
                        debug!(
                            "Listener {} fell behind, skipping {} -> {}",
                            self.id.short(),
                            from,
                            self.cursor
                        );
                        return Some(SessionEvent::FastForward {
                            from,
                            to: self.cursor,
                        });
                    }
                    ReadResult::NotYetAvailable => {}
                }
            }

            match tokio::time::timeout(self.silence_timeout, self.updates.changed()).await {
                Ok(Ok(())) => continue,
                // The buffer is owned by the station this session keeps alive.
                Ok(Err(_)) => return None,
                Err(_) => {
                    if self.cursor < self.station.buffer().write_position() {
                        continue;
                    }
                    if !self.station.is_playing() {
                        return None;
                    }
                    return Some(SessionEvent::Silence(self.silence.clone()));
                }
            }
        }
    }

    /// Byte stream for an HTTP body. Skips are invisible to the client.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
        futures::stream::unfold(self, |mut session| async move {
            loop {
                match session.next_event().await? {
                    SessionEvent::Chunk { data, .. } | SessionEvent::Silence(data) => {
                        return Some((Ok(data), session));
                    }
                    SessionEvent::FastForward { .. } => continue,
                }
            }
        })
    }
}

impl Drop for BroadcastSession {
    fn drop(&mut self) {
        let remaining = self.station.remove_listener(&self.id);
        info!(
            "{} (Total: {})",
            RadioError::TransportDisconnect(self.id),
            remaining
        );
    }
}
