use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Resolution strategies, registered in the order yt-dlp, Piped, Invidious.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourcesConfig {
    #[serde(default)]
    pub ytdlp: YtDlpConfig,
    #[serde(default = "default_piped")]
    pub piped: MirrorConfig,
    #[serde(default = "default_invidious")]
    pub invidious: MirrorConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            ytdlp: YtDlpConfig::default(),
            piped: default_piped(),
            invidious: default_invidious(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YtDlpConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ytdlp_path")]
    pub path: String,
    #[serde(default = "default_ytdlp_timeout_secs")]
    pub timeout_secs: u64,
}

impl YtDlpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_ytdlp_path(),
            timeout_secs: default_ytdlp_timeout_secs(),
        }
    }
}

/// One family of public relay mirrors, tried in the listed order.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MirrorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub instances: Vec<String>,
    #[serde(default = "default_mirror_timeout_secs")]
    pub timeout_secs: u64,
}

impl MirrorConfig {
    fn with_instances(instances: &[&str]) -> Self {
        Self {
            enabled: true,
            instances: instances.iter().map(|s| s.to_string()).collect(),
            timeout_secs: default_mirror_timeout_secs(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_piped() -> MirrorConfig {
    MirrorConfig::with_instances(&[
        "https://pipedapi.kavin.rocks",
        "https://pipedapi.in.projectsegfau.lt",
        "https://api.piped.privacydev.net",
    ])
}

fn default_invidious() -> MirrorConfig {
    MirrorConfig::with_instances(&[
        "https://yt.artemislena.eu",
        "https://invidious.flokinet.to",
        "https://inv.nadeko.net",
        "https://yewtu.be",
    ])
}

fn default_true() -> bool {
    true
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_ytdlp_timeout_secs() -> u64 {
    30
}

fn default_mirror_timeout_secs() -> u64 {
    10
}
