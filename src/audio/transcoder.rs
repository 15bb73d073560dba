use std::process::Stdio;

use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::{Child, Command},
};
use tracing::debug;

use crate::configs::StreamConfig;

/// Spawns the external process that turns a resolved source URL into the
/// station's constant-format byte stream on stdout.
pub trait Transcoder: Send + Sync {
    fn name(&self) -> &str;

    /// The returned child must have a piped stdout and must be killed when
    /// dropped.
    fn spawn(&self, source_url: &str) -> std::io::Result<Child>;
}

pub struct FfmpegTranscoder {
    config: StreamConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: StreamConfig) -> Self {
        Self { config }
    }

    /// Content type of the produced stream.
    pub fn content_type() -> &'static str {
        "audio/mpeg"
    }

    /// Input options go before `-i`, ffmpeg ignores them afterwards.
    pub fn args(&self, source_url: &str) -> Vec<String> {
        let mut args: Vec<String> = [
            "-hide_banner",
            "-loglevel",
            "error",
            "-nostdin",
            "-reconnect",
            "1",
            "-reconnect_streamed",
            "1",
            "-reconnect_delay_max",
            "5",
            "-fflags",
            "+genpts+discardcorrupt+nobuffer",
            "-flags",
            "low_delay",
            "-i",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        args.push(source_url.to_string());
        args.extend([
            "-vn".to_string(),
            "-acodec".to_string(),
            "libmp3lame".to_string(),
            "-b:a".to_string(),
            format!("{}k", self.config.bitrate_kbps),
            "-ar".to_string(),
            self.config.sample_rate.to_string(),
            "-ac".to_string(),
            self.config.channels.to_string(),
            "-max_delay".to_string(),
            "50000".to_string(),
            "-f".to_string(),
            "mp3".to_string(),
            "pipe:1".to_string(),
        ]);
        args
    }
}

impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn spawn(&self, source_url: &str) -> std::io::Result<Child> {
        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(self.args(source_url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // An unread stderr pipe eventually fills up and stalls ffmpeg.
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("ffmpeg: {}", line);
                }
            });
        }

        Ok(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_options_precede_input() {
        let transcoder = FfmpegTranscoder::new(StreamConfig::default());
        let args = transcoder.args("https://example.com/audio.m4a");

        let input = args.iter().position(|a| a == "-i").unwrap();
        let reconnect = args.iter().position(|a| a == "-reconnect").unwrap();
        let fflags = args.iter().position(|a| a == "-fflags").unwrap();
        assert!(reconnect < input);
        assert!(fflags < input);
        assert_eq!(args[input + 1], "https://example.com/audio.m4a");
        assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
    }

    #[test]
    fn test_output_format_follows_config() {
        let transcoder = FfmpegTranscoder::new(StreamConfig {
            ffmpeg_path: "ffmpeg".into(),
            bitrate_kbps: 192,
            sample_rate: 48_000,
            channels: 1,
        });
        let args = transcoder.args("src").join(" ");

        assert!(args.contains("-vn -acodec libmp3lame -b:a 192k -ar 48000 -ac 1"));
        assert!(args.contains("-f mp3 pipe:1"));
    }
}
