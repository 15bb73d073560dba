use std::sync::LazyLock;

use regex::Regex;

use crate::common::types::VideoId;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:youtube(?:-nocookie)?\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/|live/|v/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
    )
    .unwrap()
});

static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

/// Pulls the 11-character video id out of a watch, short, embed, shorts or
/// live URL, or accepts a bare id.
pub fn extract_video_id(reference: &str) -> Option<VideoId> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    if let Some(caps) = URL_PATTERN.captures(reference) {
        return caps.get(1).map(|m| VideoId(m.as_str().to_string()));
    }

    BARE_ID
        .is_match(reference)
        .then(|| VideoId(reference.to_string()))
}

/// Canonical watch URL for an id.
pub fn watch_url(id: &VideoId) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}
