use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{
    plugin::StreamProvider,
    utils::{highest_bitrate, host_of, url_of},
};
use crate::common::types::{AnyResult, VideoId};

/// A single Piped API instance.
pub struct PipedProvider {
    name: String,
    instance: String,
    client: Client,
    timeout: Duration,
}

impl PipedProvider {
    pub fn new(instance: &str, client: Client, timeout: Duration) -> Self {
        let instance = instance.trim_end_matches('/').to_string();
        Self {
            name: format!("piped:{}", host_of(&instance)),
            instance,
            client,
            timeout,
        }
    }
}

#[async_trait]
impl StreamProvider for PipedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn stream_url(&self, video_id: &VideoId) -> AnyResult<String> {
        let url = format!("{}/streams/{}", self.instance, video_id);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()).into());
        }

        let data: Value = resp.json().await?;
        select_audio_stream(&data).ok_or_else(|| "no audio streams listed".into())
    }
}

/// Highest-bitrate entry of `audioStreams`.
pub fn select_audio_stream(data: &Value) -> Option<String> {
    let streams = data.get("audioStreams")?.as_array()?;
    highest_bitrate(streams, "bitrate").and_then(url_of)
}
