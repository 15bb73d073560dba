//! Test doubles shared by the engine tests.

use std::{
    process::Stdio,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::{
    audio::transcoder::Transcoder,
    common::{errors::RadioError, types::VideoId},
    configs::PlayerConfig,
    player::{Station, Track},
    sources::TrackResolver,
};

/// Runs `sh -c <script>` in place of ffmpeg. `{url}` in the script is
/// replaced with the resolved URL.
pub struct ShellTranscoder {
    script: String,
    spawns: AtomicUsize,
}

impl ShellTranscoder {
    pub fn new(script: &str) -> Self {
        Self {
            script: script.to_string(),
            spawns: AtomicUsize::new(0),
        }
    }

    pub fn spawns(&self) -> usize {
        self.spawns.load(Ordering::SeqCst)
    }
}

impl Transcoder for ShellTranscoder {
    fn name(&self) -> &str {
        "sh"
    }

    fn spawn(&self, source_url: &str) -> std::io::Result<Child> {
        self.spawns.fetch_add(1, Ordering::SeqCst);
        Command::new("sh")
            .arg("-c")
            .arg(self.script.replace("{url}", source_url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
    }
}

type Mapping = Box<dyn Fn(&str) -> String + Send + Sync>;

pub struct StaticResolver {
    mapping: Option<Mapping>,
    calls: AtomicUsize,
}

impl StaticResolver {
    /// Resolves every reference to `resolved:<reference>`.
    pub fn ok() -> Self {
        Self::mapping(|reference| format!("resolved:{}", reference))
    }

    pub fn failing() -> Self {
        Self {
            mapping: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn mapping(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            mapping: Some(Box::new(f)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrackResolver for StaticResolver {
    async fn resolve(&self, reference: &str) -> Result<String, RadioError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mapping {
            Some(mapping) => Ok(mapping(reference)),
            None => Err(RadioError::ResolutionFailure {
                reference: reference.to_string(),
                attempts: 1,
            }),
        }
    }
}

pub fn station_with(
    config: PlayerConfig,
    resolver: Arc<dyn TrackResolver>,
    transcoder: Arc<dyn Transcoder>,
) -> Arc<Station> {
    Station::new(config, resolver, transcoder, None)
}

pub fn track(id: &str) -> Track {
    Track::from_reference(VideoId(id.to_string()), id)
}

/// Polls `condition` every 10ms until it holds or `timeout` passes.
pub async fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
