//! Per-chunk speech synthesis.

pub mod voice;

pub use voice::{AccentVariant, Gender, Language, VoiceParameters, resolve_voice};

use crate::text::{TextChunk, char_len, normalize};
use speech_client::{SpeechError, SpeechProvider, SpeechRequest};
use std::sync::Arc;

/// Minimum characters worth sending to the speech engine.
pub const MIN_TEXT_LENGTH: usize = 10;

/// Per-chunk minimum used by the pipeline. The whole text is checked against
/// the configured minimum before splitting, so packed chunks only need to be
/// non-empty.
pub const MIN_CHUNK_LENGTH: usize = 1;

/// Encoded audio for exactly one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFragment {
    /// Index of the chunk this audio was synthesized from
    pub index: usize,
    /// Encoded audio (MP3)
    pub bytes: Vec<u8>,
}

impl AudioFragment {
    pub fn new(index: usize, bytes: Vec<u8>) -> Self {
        Self { index, bytes }
    }
}

/// Sends chunks to a speech provider one at a time.
pub struct SynthesisClient {
    provider: Arc<dyn SpeechProvider>,
    min_text_length: usize,
}

impl SynthesisClient {
    pub fn new(provider: Arc<dyn SpeechProvider>, min_text_length: usize) -> Self {
        Self {
            provider,
            min_text_length,
        }
    }

    /// Synthesize one chunk.
    ///
    /// Text that is empty or shorter than the minimum after normalization is
    /// rejected before any request is made.
    pub async fn synthesize(
        &self,
        chunk: &TextChunk,
        voice: &VoiceParameters,
    ) -> Result<AudioFragment, SpeechError> {
        let text = normalize(&chunk.text);
        let length = char_len(&text);

        if length == 0 {
            return Err(SpeechError::EmptyText);
        }
        if length < self.min_text_length {
            return Err(SpeechError::TextTooShort {
                length,
                minimum: self.min_text_length,
            });
        }

        log::debug!(
            "Synthesizing chunk {} ({} chars, lang={}, tld={}) via {}",
            chunk.index,
            length,
            voice.language,
            voice.accent.tld(),
            self.provider.name()
        );

        let request = SpeechRequest::new(text, voice.language.as_str(), voice.accent.tld());
        let bytes = self.provider.synthesize(&request).await?;

        Ok(AudioFragment::new(chunk.index, bytes))
    }
}
