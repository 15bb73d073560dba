use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{buffer::LiveBuffer, transcoder::Transcoder};
use crate::{
    common::{errors::RadioError, types::AnyResult},
    configs::PlayerConfig,
    player::Station,
};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The transcoder reached the end of the source and exited cleanly.
    Completed,
    /// Every attempt failed.
    Exhausted,
    /// The track was stopped.
    Cancelled,
}

enum AttemptEnd {
    Exited(std::process::ExitStatus),
    Cancelled,
}

/// Runs the transcoder for one track and feeds its output into the live
/// buffer, retrying a bounded number of times.
pub struct IngestPipeline {
    transcoder: Arc<dyn Transcoder>,
    chunk_size: usize,
    notify_every: u64,
    max_retries: u32,
    retry_delay: Duration,
}

/// Keeps `is_ingesting` raised for as long as an ingest is in flight, including
/// when the future is dropped mid-way.
struct IngestingGuard<'a>(&'a Station);

impl<'a> IngestingGuard<'a> {
    fn raise(station: &'a Station) -> Self {
        station.set_ingesting(true);
        Self(station)
    }
}

impl Drop for IngestingGuard<'_> {
    fn drop(&mut self) {
        self.0.set_ingesting(false);
    }
}

impl IngestPipeline {
    pub fn new(transcoder: Arc<dyn Transcoder>, config: &PlayerConfig) -> Self {
        Self {
            transcoder,
            chunk_size: config.chunk_size.max(1),
            notify_every: config.notify_every.max(1),
            max_retries: config.retry_budget(),
            retry_delay: config.retry_delay(),
        }
    }

    pub async fn ingest(
        &self,
        station: &Station,
        source_url: &str,
        cancel: &CancellationToken,
    ) -> IngestOutcome {
        let _guard = IngestingGuard::raise(station);
        let mut attempts = 0;

        while attempts < self.max_retries {
            if cancel.is_cancelled() || !station.is_playing() {
                return IngestOutcome::Cancelled;
            }

            info!(
                "Starting {} (attempt {}/{})",
                self.transcoder.name(),
                attempts + 1,
                self.max_retries
            );

            match self.attempt(station, source_url, cancel).await {
                Ok(AttemptEnd::Exited(status)) if status.success() => {
                    info!("Stream completed");
                    return IngestOutcome::Completed;
                }
                Ok(AttemptEnd::Exited(status)) => {
                    warn!("Stream interrupted ({}), retrying...", status);
                }
                Ok(AttemptEnd::Cancelled) => {
                    info!("Ingest cancelled");
                    return IngestOutcome::Cancelled;
                }
                Err(e) => error!("Stream error: {}", e),
            }

            attempts += 1;
            if attempts < self.max_retries {
                tokio::select! {
                    _ = cancel.cancelled() => return IngestOutcome::Cancelled,
                    _ = tokio::time::sleep(self.retry_delay) => {}
                }
            }
        }

        error!("{}", RadioError::IngestionExhausted { attempts });
        IngestOutcome::Exhausted
    }

    /// One transcoder run. The child is killed on every way out: explicitly on
    /// cancellation, through `kill_on_drop` on errors.
    async fn attempt(
        &self,
        station: &Station,
        source_url: &str,
        cancel: &CancellationToken,
    ) -> AnyResult<AttemptEnd> {
        let mut child = self.transcoder.spawn(source_url)?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or("transcoder stdout is not piped")?;

        let buffer = station.buffer();
        let mut chunk = vec![0u8; self.chunk_size];
        let mut filled = 0;
        let mut appended: u64 = 0;
        let mut last_report = Instant::now();

        loop {
            // Async pipe reads park until data arrives; 0 means the write end closed.
            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    buffer.notify();
                    return Ok(AttemptEnd::Cancelled);
                }
                read = stdout.read(&mut chunk[filled..]) => read,
            };

            let n = match read {
                Ok(n) => n,
                Err(e) => {
                    buffer.notify();
                    return Err(e.into());
                }
            };
            if n == 0 {
                break;
            }

            filled += n;
            if filled == chunk.len() {
                self.publish(buffer, Bytes::copy_from_slice(&chunk), &mut appended);
                filled = 0;
            }

            if last_report.elapsed() >= PROGRESS_INTERVAL {
                info!(
                    "Streaming: {} chunks (Listeners: {})",
                    appended,
                    station.listener_count()
                );
                last_report = Instant::now();
            }
        }

        if filled > 0 {
            self.publish(buffer, Bytes::copy_from_slice(&chunk[..filled]), &mut appended);
        }
        buffer.notify();
        debug!("Transcoder output ended after {} chunks", appended);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                Ok(AttemptEnd::Cancelled)
            }
            status = child.wait() => Ok(AttemptEnd::Exited(status?)),
        }
    }

    fn publish(&self, buffer: &LiveBuffer, data: Bytes, appended: &mut u64) {
        buffer.append(data);
        *appended += 1;
        if *appended % self.notify_every == 0 {
            buffer.notify();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audio::buffer::ReadResult,
        player::state::PlayerStatus,
        testing::{ShellTranscoder, StaticResolver, station_with},
    };

    fn config() -> PlayerConfig {
        PlayerConfig {
            chunk_size: 4096,
            max_retries: 2,
            retry_delay_ms: 10,
            ..Default::default()
        }
    }

    fn playing_station(transcoder: Arc<dyn Transcoder>) -> Arc<Station> {
        let station = station_with(config(), Arc::new(StaticResolver::ok()), transcoder);
        station.force_status(PlayerStatus::Playing);
        station
    }

    #[tokio::test]
    async fn test_completed_run_chunks_output() {
        let transcoder = Arc::new(ShellTranscoder::new("head -c 10000 /dev/zero"));
        let station = playing_station(transcoder.clone());

        let outcome = station
            .ingest_pipeline()
            .ingest(&station, "src", &CancellationToken::new())
            .await;

        assert_eq!(outcome, IngestOutcome::Completed);
        assert_eq!(transcoder.spawns(), 1);

        let buffer = station.buffer();
        assert_eq!(buffer.write_position(), 3);
        match buffer.read(0) {
            ReadResult::Chunk(data) => assert_eq!(data.len(), 4096),
            other => panic!("unexpected read: {:?}", other),
        }
        match buffer.read(2) {
            ReadResult::Chunk(data) => assert_eq!(data.len(), 10000 - 2 * 4096),
            other => panic!("unexpected read: {:?}", other),
        }
        assert!(!station.status().is_streaming);
    }

    #[tokio::test]
    async fn test_failing_transcoder_exhausts_budget() {
        let transcoder = Arc::new(ShellTranscoder::new("exit 3"));
        let station = playing_station(transcoder.clone());

        let outcome = station
            .ingest_pipeline()
            .ingest(&station, "src", &CancellationToken::new())
            .await;

        assert_eq!(outcome, IngestOutcome::Exhausted);
        assert_eq!(transcoder.spawns(), 2);
        assert!(!station.status().is_streaming);
    }

    #[tokio::test]
    async fn test_partial_output_before_failure_is_kept() {
        let transcoder = Arc::new(ShellTranscoder::new("head -c 5000 /dev/zero; exit 1"));
        let station = playing_station(transcoder.clone());

        let outcome = station
            .ingest_pipeline()
            .ingest(&station, "src", &CancellationToken::new())
            .await;

        assert_eq!(outcome, IngestOutcome::Exhausted);
        // Two attempts, each a full chunk plus a 904 byte tail.
        assert_eq!(station.buffer().write_position(), 4);
    }

    #[tokio::test]
    async fn test_cancel_kills_running_transcoder() {
        let transcoder = Arc::new(ShellTranscoder::new(
            "while true; do head -c 4096 /dev/zero; sleep 0.05; done",
        ));
        let station = playing_station(transcoder.clone());
        let cancel = CancellationToken::new();

        let task = {
            let station = station.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                station
                    .ingest_pipeline()
                    .ingest(&station, "src", &cancel)
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(station.status().is_streaming);
        cancel.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("ingest should stop promptly")
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Cancelled);
        assert_eq!(transcoder.spawns(), 1);
        assert!(!station.status().is_streaming);
    }

    #[tokio::test]
    async fn test_zero_retry_budget_still_runs_once() {
        let transcoder = Arc::new(ShellTranscoder::new("head -c 10 /dev/zero"));
        let config = PlayerConfig {
            max_retries: 0,
            ..config()
        };
        let station = station_with(config, Arc::new(StaticResolver::ok()), transcoder.clone());
        station.force_status(PlayerStatus::Playing);

        let outcome = station
            .ingest_pipeline()
            .ingest(&station, "src", &CancellationToken::new())
            .await;

        assert_eq!(outcome, IngestOutcome::Completed);
        assert_eq!(transcoder.spawns(), 1);
    }

    #[tokio::test]
    async fn test_stopped_station_does_not_spawn() {
        let transcoder = Arc::new(ShellTranscoder::new("head -c 10 /dev/zero"));
        let station = station_with(config(), Arc::new(StaticResolver::ok()), transcoder.clone());

        let outcome = station
            .ingest_pipeline()
            .ingest(&station, "src", &CancellationToken::new())
            .await;

        assert_eq!(outcome, IngestOutcome::Cancelled);
        assert_eq!(transcoder.spawns(), 0);
    }

    #[tokio::test]
    async fn test_listeners_are_notified_in_batches() {
        let transcoder = Arc::new(ShellTranscoder::new("head -c 8192 /dev/zero"));
        let station = playing_station(transcoder);
        let mut updates = station.buffer().subscribe();

        let outcome = station
            .ingest_pipeline()
            .ingest(&station, "src", &CancellationToken::new())
            .await;
        assert_eq!(outcome, IngestOutcome::Completed);

        // Two chunks never reach the batch size of three, the end-of-attempt
        // notification still publishes them.
        assert!(updates.has_changed().unwrap());
        assert_eq!(*updates.borrow_and_update(), 2);
    }
}
