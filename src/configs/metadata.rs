use serde::{Deserialize, Serialize};

/// YouTube Data API v3 settings. Without a key the station queues tracks by
/// bare reference and search is unavailable.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MetadataConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl MetadataConfig {
    /// Falls back to `YOUTUBE_API_KEY` when the file leaves the key unset.
    pub fn apply_env(&mut self) {
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            self.api_key = std::env::var("YOUTUBE_API_KEY")
                .ok()
                .filter(|k| !k.is_empty());
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}
