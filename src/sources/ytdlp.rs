use std::{process::Stdio, time::Duration};

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use super::{
    identifier::watch_url,
    plugin::StreamProvider,
    utils::{highest_bitrate, url_of},
};
use crate::{
    common::{http::MOBILE_USER_AGENT, types::AnyResult, types::VideoId},
    configs::YtDlpConfig,
};

/// Resolves through a local `yt-dlp` executable.
pub struct YtDlpProvider {
    path: String,
    timeout: Duration,
}

impl YtDlpProvider {
    pub fn new(config: &YtDlpConfig) -> Self {
        Self {
            path: config.path.clone(),
            timeout: config.timeout(),
        }
    }

    /// Version string of the configured executable, `None` when it cannot be run.
    pub async fn probe(path: &str) -> Option<String> {
        let output = Command::new(path)
            .arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .ok()?;
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn args(&self, video_id: &VideoId) -> Vec<String> {
        let socket_timeout = self.timeout.as_secs().max(1).to_string();
        [
            "--dump-single-json",
            "--no-playlist",
            "--no-warnings",
            "--quiet",
            "-f",
            "bestaudio/best",
            "--socket-timeout",
            socket_timeout.as_str(),
            "--user-agent",
            MOBILE_USER_AGENT,
            "--extractor-args",
            "youtube:player_client=android,web;player_skip=configs,webpage",
        ]
        .iter()
        .map(|s| s.to_string())
        .chain(std::iter::once(watch_url(video_id)))
        .collect()
    }
}

#[async_trait]
impl StreamProvider for YtDlpProvider {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn stream_url(&self, video_id: &VideoId) -> AnyResult<String> {
        let output = Command::new(&self.path)
            .args(self.args(video_id))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let excerpt: String = stderr.trim().chars().take(200).collect();
            return Err(format!("yt-dlp exited with {}: {}", output.status, excerpt).into());
        }

        let info: Value = serde_json::from_slice(&output.stdout)?;
        select_stream_url(&info).ok_or_else(|| "yt-dlp listed no audio-capable format".into())
    }
}

/// Picks the URL to play from a `--dump-single-json` document: the top-level
/// `url` if the selected format produced one, otherwise the best m4a audio
/// format, otherwise the best format with any audio codec.
pub fn select_stream_url(info: &Value) -> Option<String> {
    if let Some(url) = info.get("url").and_then(Value::as_str) {
        return Some(url.to_string());
    }

    let formats = info.get("formats")?.as_array()?;
    let has_audio = |f: &&Value| {
        f.get("acodec")
            .and_then(Value::as_str)
            .is_some_and(|codec| codec != "none")
    };

    let m4a = formats
        .iter()
        .filter(has_audio)
        .filter(|f| f.get("ext").and_then(Value::as_str) == Some("m4a"));

    highest_bitrate(m4a, "abr")
        .or_else(|| highest_bitrate(formats.iter().filter(has_audio), "abr"))
        .and_then(url_of)
}
