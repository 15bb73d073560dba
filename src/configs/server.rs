use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL listeners use to reach this server; advertised by
    /// `/api/play` and `/api/radio/url`.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl ServerConfig {
    pub fn radio_url(&self) -> String {
        let base = self
            .public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port));
        format!("{}/api/stream", base.trim_end_matches('/'))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Display information for the broadcast plus tracks queued on startup.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StationConfig {
    #[serde(default = "default_station_name")]
    pub name: String,
    #[serde(default = "default_genre")]
    pub genre: String,
    #[serde(default)]
    pub default_tracks: Vec<String>,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            name: default_station_name(),
            genre: default_genre(),
            default_tracks: Vec::new(),
        }
    }
}

fn default_station_name() -> String {
    "Rustaradio 24/7".to_string()
}

fn default_genre() -> String {
    "Various".to_string()
}
