//! Audio assembly: merging per-chunk fragments into one MP3.

pub mod codec;
pub mod stitcher;

pub use codec::{AudioCodec, CodecError, FfmpegCodec, PcmAudio};
pub use stitcher::{AudioArtifact, AudioStitcher, MergeMode};
