//! pdf2audio - turn extracted document text into one continuous MP3
//!
//! The speech engine caps how much text a single request may carry, so text
//! is cleaned, split at sentence boundaries into chunks under that cap,
//! synthesized chunk by chunk and stitched back into one stream.

pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod text;
pub mod tts;

pub use audio::{AudioArtifact, MergeMode};
pub use config::Config;
pub use error::{ErrorKind, PipelineError};
pub use pipeline::{Pipeline, SynthesisProgress};
pub use tts::{Gender, Language};
