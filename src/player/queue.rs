use std::{collections::VecDeque, time::Duration};

use parking_lot::Mutex;
use tokio::sync::Notify;

use super::state::Track;

/// FIFO of tracks waiting to play. Enqueues wake an idle scheduler.
#[derive(Default)]
pub struct PlaylistQueue {
    tracks: Mutex<VecDeque<Track>>,
    wakeup: Notify,
}

impl PlaylistQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `track` and returns its 1-based position.
    pub fn push(&self, track: Track) -> usize {
        let position = {
            let mut tracks = self.tracks.lock();
            tracks.push_back(track);
            tracks.len()
        };
        self.wakeup.notify_one();
        position
    }

    pub fn pop(&self) -> Option<Track> {
        self.tracks.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.tracks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Track> {
        self.tracks.lock().iter().cloned().collect()
    }

    /// Returns once something was pushed or `poll` elapsed, whichever is
    /// first. A push that happened before the call still counts.
    pub async fn wait(&self, poll: Duration) {
        let _ = tokio::time::timeout(poll, self.wakeup.notified()).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::common::types::VideoId;

    fn track(id: &str) -> Track {
        Track::from_reference(VideoId(id.to_string()), id)
    }

    #[test]
    fn test_fifo_order_and_positions() {
        let queue = PlaylistQueue::new();
        assert_eq!(queue.push(track("aaaaaaaaaaa")), 1);
        assert_eq!(queue.push(track("bbbbbbbbbbb")), 2);

        let ids: Vec<String> = queue.snapshot().into_iter().map(|t| t.id.0).collect();
        assert_eq!(ids, ["aaaaaaaaaaa", "bbbbbbbbbbb"]);

        assert_eq!(queue.pop().unwrap().id.0, "aaaaaaaaaaa");
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop().unwrap().id.0, "bbbbbbbbbbb");
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_after_poll_interval() {
        let queue = PlaylistQueue::new();
        let started = tokio::time::Instant::now();
        queue.wait(Duration::from_secs(5)).await;
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_wakes_waiter() {
        let queue = Arc::new(PlaylistQueue::new());
        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move {
                let started = tokio::time::Instant::now();
                queue.wait(Duration::from_secs(60)).await;
                started.elapsed()
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.push(track("aaaaaaaaaaa"));

        let waited = waiter.await.unwrap();
        assert!(waited < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_before_wait_is_not_lost() {
        let queue = PlaylistQueue::new();
        queue.push(track("aaaaaaaaaaa"));

        let started = tokio::time::Instant::now();
        queue.wait(Duration::from_secs(60)).await;
        assert!(started.elapsed() < Duration::from_secs(60));
    }
}
