use std::{collections::HashMap, sync::LazyLock};

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{MetadataProvider, SearchResult, TrackMetadata};
use crate::{
    common::{errors::RadioError, http::HttpClient, types::AnyResult, types::VideoId},
    configs::MetadataConfig,
    sources::identifier::watch_url,
};

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").unwrap()
});

/// YouTube Data API v3 client.
pub struct YouTubeDataApi {
    client: Client,
    api_url: String,
    api_key: String,
}

impl YouTubeDataApi {
    /// `Ok(None)` when no API key is configured.
    pub fn new(config: &MetadataConfig) -> AnyResult<Option<Self>> {
        let Some(api_key) = config.api_key.clone().filter(|k| !k.is_empty()) else {
            return Ok(None);
        };

        let client =
            HttpClient::with_timeout(std::time::Duration::from_secs(config.timeout_secs))?;
        Ok(Some(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key,
        }))
    }

    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value, RadioError> {
        let url = format!("{}/{}", self.api_url, endpoint);
        debug!("YouTube API request: {} {:?}", endpoint, params);

        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| RadioError::Metadata(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(200).collect();
            warn!("YouTube API error: {} - {}", status, excerpt);
            return Err(RadioError::Metadata(format!("YouTube API returned {}", status)));
        }

        resp.json()
            .await
            .map_err(|e| RadioError::Metadata(e.to_string()))
    }

    async fn durations(&self, ids: &[&str]) -> HashMap<String, u64> {
        if ids.is_empty() {
            return HashMap::new();
        }

        let joined = ids.join(",");
        match self
            .get("videos", &[("part", "contentDetails"), ("id", joined.as_str())])
            .await
        {
            Ok(data) => parse_durations(&data),
            Err(e) => {
                warn!("Duration lookup failed, reporting 0: {}", e);
                HashMap::new()
            }
        }
    }
}

#[async_trait]
impl MetadataProvider for YouTubeDataApi {
    async fn lookup(&self, video_id: &VideoId) -> Result<Option<TrackMetadata>, RadioError> {
        let data = self
            .get(
                "videos",
                &[("part", "snippet,contentDetails"), ("id", video_id.0.as_str())],
            )
            .await?;

        Ok(data
            .get("items")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .and_then(parse_video_item))
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, RadioError> {
        info!("Searching via YouTube API: {}", query);
        let max_results = limit.to_string();
        let data = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("q", query),
                    ("type", "video"),
                    ("videoCategoryId", "10"),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;

        let mut results = parse_search_items(&data);
        let ids: Vec<&str> = results.iter().map(|r| r.id.0.as_str()).collect();
        let durations = self.durations(&ids).await;
        for result in &mut results {
            result.duration = durations.get(result.id.0.as_str()).copied().unwrap_or(0);
        }

        info!("Found {} results via YouTube API", results.len());
        Ok(results)
    }
}

/// Seconds in an ISO-8601 duration such as `PT4M13S`. Unparsable input is 0.
pub fn parse_duration(duration: &str) -> u64 {
    let Some(caps) = ISO_DURATION.captures(duration.trim()) else {
        return 0;
    };
    let part = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    part(1) * 86_400 + part(2) * 3600 + part(3) * 60 + part(4)
}

fn high_thumbnail(snippet: &Value) -> Option<String> {
    let thumbnails = snippet.get("thumbnails")?;
    ["high", "medium", "default"]
        .iter()
        .find_map(|size| thumbnails.get(size)?.get("url")?.as_str())
        .map(str::to_string)
}

fn text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// One `videos` item with `snippet` and `contentDetails`.
pub fn parse_video_item(item: &Value) -> Option<TrackMetadata> {
    let snippet = item.get("snippet")?;
    Some(TrackMetadata {
        title: text(snippet, "title")?,
        artist: text(snippet, "channelTitle").unwrap_or_else(|| "Unknown Artist".to_string()),
        duration: item
            .get("contentDetails")
            .and_then(|d| d.get("duration"))
            .and_then(Value::as_str)
            .map(parse_duration)
            .unwrap_or(0),
        thumbnail: high_thumbnail(snippet),
    })
}

/// `search` items, durations left at 0.
pub fn parse_search_items(data: &Value) -> Vec<SearchResult> {
    let Some(items) = data.get("items").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let id = VideoId(text(item.get("id")?, "videoId")?);
            let snippet = item.get("snippet")?;
            Some(SearchResult {
                url: watch_url(&id),
                title: text(snippet, "title")?,
                duration: 0,
                thumbnail: high_thumbnail(snippet),
                artist: text(snippet, "channelTitle").unwrap_or_default(),
                source: "youtube_api",
                id,
            })
        })
        .collect()
}

fn parse_durations(data: &Value) -> HashMap<String, u64> {
    data.get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let id = text(item, "id")?;
                    let duration = item.get("contentDetails")?.get("duration")?.as_str()?;
                    Some((id, parse_duration(duration)))
                })
                .collect()
        })
        .unwrap_or_default()
}
