//! Mock speech provider for testing
//!
//! Returns deterministic fake audio that embeds the request text, so callers
//! can check that fragments end up in the right order, and can be scripted
//! to fail on a given call.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::{Result, SpeechError};
use crate::provider::{SpeechProvider, SpeechRequest};

#[derive(Debug, Clone)]
enum Failure {
    Never,
    OnCall(usize, SpeechError),
    Always(SpeechError),
}

/// A mock provider that records every request it receives
pub struct MockProvider {
    failure: Failure,
    /// Minimum size of each fake audio response
    audio_size: usize,
    requests: Mutex<Vec<SpeechRequest>>,
    name: &'static str,
}

impl MockProvider {
    /// Create a provider that always succeeds with `audio_size`-byte responses
    pub fn always_succeeds(audio_size: usize) -> Self {
        Self {
            failure: Failure::Never,
            audio_size,
            requests: Mutex::new(Vec::new()),
            name: "mock",
        }
    }

    /// Create a provider whose zero-based call `n` fails with `error`
    pub fn fails_on_call(n: usize, error: SpeechError, audio_size: usize) -> Self {
        Self {
            failure: Failure::OnCall(n, error),
            ..Self::always_succeeds(audio_size)
        }
    }

    /// Create a provider that always fails with the given error
    pub fn always_fails(error: SpeechError) -> Self {
        Self {
            failure: Failure::Always(error),
            ..Self::always_succeeds(0)
        }
    }

    /// Set a custom provider name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Get the number of times synthesize() was called
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests received so far, in call order
    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Fake audio for `text`: `<text>` followed by zero padding up to `size` bytes
    pub fn fake_audio(text: &str, size: usize) -> Vec<u8> {
        let mut audio = format!("<{}>", text).into_bytes();
        if audio.len() < size {
            audio.resize(size, 0);
        }
        audio
    }
}

#[async_trait]
impl SpeechProvider for MockProvider {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let call_num = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };

        match &self.failure {
            Failure::Always(error) => return Err(error.clone()),
            Failure::OnCall(n, error) if *n == call_num => return Err(error.clone()),
            _ => {}
        }

        Ok(Self::fake_audio(&request.text, self.audio_size))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> SpeechRequest {
        SpeechRequest::new(text, "en", "com")
    }

    #[tokio::test]
    async fn test_always_succeeds() {
        let provider = MockProvider::always_succeeds(16);
        let audio = provider.synthesize(&request("hi")).await.unwrap();
        assert_eq!(audio.len(), 16);
        assert!(audio.starts_with(b"<hi>"));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_always_fails() {
        let provider = MockProvider::always_fails(SpeechError::Unreachable("down".to_string()));
        for _ in 0..3 {
            assert!(provider.synthesize(&request("hi")).await.is_err());
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fails_on_call() {
        let provider =
            MockProvider::fails_on_call(1, SpeechError::Unreachable("down".to_string()), 8);

        assert!(provider.synthesize(&request("a")).await.is_ok());
        assert!(provider.synthesize(&request("b")).await.is_err());
        assert!(provider.synthesize(&request("c")).await.is_ok());

        let texts: Vec<String> = provider.requests().into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_with_name() {
        let provider = MockProvider::always_succeeds(8).with_name("fallback");
        assert_eq!(provider.name(), "fallback");
        assert_eq!(MockProvider::always_succeeds(8).name(), "mock");
    }

    #[test]
    fn test_fake_audio_longer_than_size() {
        let audio = MockProvider::fake_audio("abcdef", 4);
        assert_eq!(audio, b"<abcdef>");
    }
}
