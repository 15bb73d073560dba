pub mod identifier;
pub mod invidious;
pub mod manager;
pub mod piped;
pub mod plugin;
pub mod utils;
pub mod ytdlp;

pub use identifier::extract_video_id;
pub use manager::SourceManager;
pub use plugin::{StreamProvider, TrackResolver};
