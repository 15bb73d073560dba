use serde::{Deserialize, Serialize};

use crate::common::types::AnyResult;
use crate::configs::*;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub station: StationConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    pub logging: Option<LoggingConfig>,
}

impl Config {
    pub fn load() -> AnyResult<Self> {
        let config_path = if std::path::Path::new("config.toml").exists() {
            "config.toml"
        } else if std::path::Path::new("config.default.toml").exists() {
            "config.default.toml"
        } else {
            return Err("config.toml or config.default.toml not found".into());
        };

        crate::log_println!("Loading configuration from: {}", config_path);

        let config_str = std::fs::read_to_string(config_path)?;
        Self::parse(&config_str)
    }

    pub fn parse(source: &str) -> AnyResult<Self> {
        let mut config: Config = toml::from_str(source)?;
        config.metadata.apply_env();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.player.buffer_capacity, 1000);
        assert_eq!(config.player.chunk_size, 4096);
        assert_eq!(config.player.max_retries, 2);
        assert_eq!(config.stream.bitrate_kbps, 128);
        assert!(config.sources.ytdlp.enabled);
        assert_eq!(config.sources.piped.instances.len(), 3);
        assert_eq!(config.sources.invidious.instances.len(), 4);
        assert!(config.logging.is_none());
    }

    #[test]
    fn test_partial_sections_keep_remaining_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9100

            [player]
            lookback_chunks = 4

            [sources.piped]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.player.lookback_chunks, 4);
        assert_eq!(config.player.notify_every, 3);
        assert!(!config.sources.piped.enabled);
        assert_eq!(config.sources.piped.timeout_secs, 10);
    }
}
