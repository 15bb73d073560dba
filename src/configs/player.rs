use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning for the live buffer, the listener sessions and the scheduler loop.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlayerConfig {
    /// Chunks kept in the live buffer before the oldest are overwritten.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    /// Nominal chunk size in bytes, also the size of a silence block.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// How far behind the live edge a new listener starts, in chunks.
    #[serde(default = "default_lookback_chunks")]
    pub lookback_chunks: u64,
    /// Listeners are woken once per this many appended chunks.
    #[serde(default = "default_notify_every")]
    pub notify_every: u64,
    #[serde(default = "default_silence_timeout_ms")]
    pub silence_timeout_ms: u64,
    /// Transcoder attempts per track before it is abandoned.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_requeue_delay_ms")]
    pub requeue_delay_ms: u64,
    #[serde(default = "default_idle_poll_ms")]
    pub idle_poll_ms: u64,
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,
}

impl PlayerConfig {
    /// Never zero, so a caught-up listener cannot spin on silence.
    pub fn silence_timeout(&self) -> Duration {
        Duration::from_millis(self.silence_timeout_ms.max(1))
    }

    /// Attempts per track, at least one.
    pub fn retry_budget(&self) -> u32 {
        self.max_retries.max(1)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn requeue_delay(&self) -> Duration {
        Duration::from_millis(self.requeue_delay_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
            chunk_size: default_chunk_size(),
            lookback_chunks: default_lookback_chunks(),
            notify_every: default_notify_every(),
            silence_timeout_ms: default_silence_timeout_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            requeue_delay_ms: default_requeue_delay_ms(),
            idle_poll_ms: default_idle_poll_ms(),
            restart_delay_ms: default_restart_delay_ms(),
        }
    }
}

fn default_buffer_capacity() -> usize {
    1000
}

fn default_chunk_size() -> usize {
    4096
}

fn default_lookback_chunks() -> u64 {
    10
}

fn default_notify_every() -> u64 {
    3
}

fn default_silence_timeout_ms() -> u64 {
    1000
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_requeue_delay_ms() -> u64 {
    2000
}

fn default_idle_poll_ms() -> u64 {
    5000
}

fn default_restart_delay_ms() -> u64 {
    1000
}
