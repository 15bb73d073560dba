use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{state::Track, station::Station};

/// Where the playlist loop currently is.
#[derive(Debug)]
pub(crate) enum SchedulerState {
    Idle,
    Resolving(Track, CancellationToken),
    Ingesting(Track, String, CancellationToken),
    TrackFailed(Track),
}

pub(crate) fn spawn(station: Arc<Station>) -> JoinHandle<()> {
    tokio::spawn(supervise(station))
}

/// Keeps the loop alive for the lifetime of the process. A panic inside it is
/// logged and the loop starts over; only aborting the task ends it.
async fn supervise(station: Arc<Station>) {
    info!("Starting continuous radio stream (24/7 mode)");
    loop {
        let result = AssertUnwindSafe(run(station.clone())).catch_unwind().await;
        match result {
            Ok(()) => return,
            Err(panic) => {
                error!("Radio loop crashed: {}", panic_message(&*panic));
                tokio::time::sleep(station.config().restart_delay()).await;
                warn!("Restarting radio loop");
            }
        }
    }
}

async fn run(station: Arc<Station>) {
    let mut state = SchedulerState::Idle;
    loop {
        state = step(&station, state).await;
    }
}

/// Advances the loop by one transition.
pub(crate) async fn step(station: &Station, state: SchedulerState) -> SchedulerState {
    match state {
        SchedulerState::Idle => match station.playlist().pop() {
            Some(track) => {
                let token = station.begin_track(&track);
                info!(
                    "NOW PLAYING: {} by {} (Listeners: {})",
                    track.title,
                    track.artist,
                    station.listener_count()
                );
                SchedulerState::Resolving(track, token)
            }
            None => {
                station.clear_current();
                debug!("Playlist empty, waiting for songs...");
                station.playlist().wait(station.config().idle_poll()).await;
                SchedulerState::Idle
            }
        },

        SchedulerState::Resolving(track, token) => {
            match station.resolver().resolve(&track.url).await {
                Ok(url) => SchedulerState::Ingesting(track, url, token),
                Err(e) => {
                    warn!("Could not get audio for {}: {}", track.title, e);
                    SchedulerState::TrackFailed(track)
                }
            }
        }

        SchedulerState::Ingesting(track, url, token) => {
            let outcome = station.ingest_pipeline().ingest(station, &url, &token).await;
            info!("Track finished: {} ({:?})", track.title, outcome);
            SchedulerState::Idle
        }

        SchedulerState::TrackFailed(track) => {
            info!("Requeueing {} at the end of the playlist", track.title);
            station.playlist().push(track);
            tokio::time::sleep(station.config().requeue_delay()).await;
            SchedulerState::Idle
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
