pub mod buffer;
pub mod ingest;
pub mod transcoder;

pub use buffer::{LiveBuffer, ReadResult};
pub use ingest::{IngestOutcome, IngestPipeline};
pub use transcoder::{FfmpegTranscoder, Transcoder};
