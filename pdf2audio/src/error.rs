//! Pipeline failure kinds.

use crate::audio::CodecError;
use speech_client::SpeechError;
use std::fmt;
use thiserror::Error;

/// Tag identifying which stage a pipeline failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EmptyInput,
    TooShort,
    SynthesisError,
    NoAudioProduced,
    UndersizedOutput,
    DecodeError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::EmptyInput => "EmptyInput",
            ErrorKind::TooShort => "TooShort",
            ErrorKind::SynthesisError => "SynthesisError",
            ErrorKind::NoAudioProduced => "NoAudioProduced",
            ErrorKind::UndersizedOutput => "UndersizedOutput",
            ErrorKind::DecodeError => "DecodeError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No text provided")]
    EmptyInput,

    #[error("Text too short: {length} characters (minimum {minimum})")]
    TooShort { length: usize, minimum: usize },

    #[error("Synthesis failed for chunk {chunk_index}: {source}")]
    Synthesis {
        chunk_index: usize,
        #[source]
        source: SpeechError,
    },

    #[error("No audio produced")]
    NoAudioProduced,

    #[error("Generated audio too small ({bytes} bytes, need more than {minimum})")]
    UndersizedOutput { bytes: usize, minimum: usize },

    #[error("Audio decoding failed: {0}")]
    Decode(#[from] CodecError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::EmptyInput => ErrorKind::EmptyInput,
            PipelineError::TooShort { .. } => ErrorKind::TooShort,
            PipelineError::Synthesis { .. } => ErrorKind::SynthesisError,
            PipelineError::NoAudioProduced => ErrorKind::NoAudioProduced,
            PipelineError::UndersizedOutput { .. } => ErrorKind::UndersizedOutput,
            PipelineError::Decode(_) => ErrorKind::DecodeError,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
