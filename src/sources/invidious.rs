use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{
    plugin::StreamProvider,
    utils::{highest_bitrate, host_of, url_of},
};
use crate::common::types::{AnyResult, VideoId};

/// A single Invidious instance.
pub struct InvidiousProvider {
    name: String,
    instance: String,
    client: Client,
    timeout: Duration,
}

impl InvidiousProvider {
    pub fn new(instance: &str, client: Client, timeout: Duration) -> Self {
        let instance = instance.trim_end_matches('/').to_string();
        Self {
            name: format!("invidious:{}", host_of(&instance)),
            instance,
            client,
            timeout,
        }
    }
}

#[async_trait]
impl StreamProvider for InvidiousProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn stream_url(&self, video_id: &VideoId) -> AnyResult<String> {
        let url = format!("{}/api/v1/videos/{}", self.instance, video_id);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()).into());
        }

        let data: Value = resp.json().await?;
        select_adaptive_audio(&data).ok_or_else(|| "no audio formats listed".into())
    }
}

/// Highest-bitrate `adaptiveFormats` entry whose `type` mentions audio.
/// Invidious reports `bitrate` as a string.
pub fn select_adaptive_audio(data: &Value) -> Option<String> {
    let formats = data.get("adaptiveFormats")?.as_array()?;
    let audio = formats.iter().filter(|f| {
        f.get("type")
            .and_then(Value::as_str)
            .is_some_and(|t| t.contains("audio"))
    });
    highest_bitrate(audio, "bitrate").and_then(url_of)
}
