use async_trait::async_trait;

use crate::error::Result;

/// Request to send to a speech provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    /// Language code understood by the engine (e.g. "en", "fr")
    pub language: String,
    /// Regional accent variant; for Google Translate this is the top-level domain
    pub accent: String,
}

impl SpeechRequest {
    pub fn new(
        text: impl Into<String>,
        language: impl Into<String>,
        accent: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
            accent: accent.into(),
        }
    }
}

/// Trait for speech synthesis engines
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize the request text, returning encoded audio bytes (MP3)
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>>;

    /// Get the provider name for display
    fn name(&self) -> &'static str;
}
