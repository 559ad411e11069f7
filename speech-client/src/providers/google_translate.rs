//! Google Translate text-to-speech provider
//!
//! Talks to the batch RPC endpoint behind the Translate web UI. The endpoint
//! accepts at most 100 characters per request, so longer text is split into
//! word-aligned pieces whose MP3 responses are concatenated in order.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;

use crate::error::{Result, SpeechError};
use crate::provider::{SpeechProvider, SpeechRequest};

/// Maximum characters the endpoint accepts in a single request
pub const MAX_REQUEST_CHARS: usize = 100;

const RPC_ID: &str = "jQ1olc";
const RPC_PATH: &str = "/_/TranslateWebserverUi/data/batchexecute";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; WOW64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/47.0.2526.106 Safari/537.36";

static AUDIO_PAYLOAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"jQ1olc","\[\\"(.*)\\"]"#).expect("audio payload pattern should compile")
});

/// Provider for the Google Translate speech endpoint
pub struct GoogleTranslateProvider {
    client: Client,
    base_url: Option<String>,
}

impl GoogleTranslateProvider {
    /// Create a new provider with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SpeechError::Unreachable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: None,
        })
    }

    /// Send every request to `base_url` instead of the accent's Translate domain
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        self
    }

    fn endpoint(&self, accent: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}{}", base, RPC_PATH),
            None => format!("https://translate.google.{}{}", accent, RPC_PATH),
        }
    }

    async fn synthesize_piece(&self, piece: &str, request: &SpeechRequest) -> Result<Vec<u8>> {
        let url = self.endpoint(&request.accent);

        let response = self
            .client
            .post(&url)
            .header("Referer", "http://translate.google.com/")
            .form(&[("f.req", package_rpc(piece, &request.language))])
            .send()
            .await
            .map_err(|e| SpeechError::Unreachable(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SpeechError::Unreachable(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(SpeechError::Rejected {
                status: Some(status.as_u16()),
                message: body.chars().take(200).collect(),
            });
        }

        decode_audio(&body)
    }
}

/// Build the `f.req` form value for one piece of text.
fn package_rpc(text: &str, language: &str) -> String {
    let parameter = serde_json::json!([text, language, null, "null"]).to_string();
    serde_json::json!([[[RPC_ID, parameter, null, "generic"]]]).to_string()
}

/// Pull the base64 MP3 payload out of every RPC line in the response body.
fn decode_audio(body: &str) -> Result<Vec<u8>> {
    let mut audio = Vec::new();

    for line in body.lines().filter(|line| line.contains(RPC_ID)) {
        let captures = AUDIO_PAYLOAD.captures(line).ok_or_else(|| {
            SpeechError::MalformedResponse("RPC line without audio payload".to_string())
        })?;

        let decoded = general_purpose::STANDARD
            .decode(&captures[1])
            .map_err(|e| {
                SpeechError::MalformedResponse(format!("Failed to decode base64 audio: {}", e))
            })?;
        audio.extend(decoded);
    }

    if audio.is_empty() {
        return Err(SpeechError::MalformedResponse(
            "response contained no audio".to_string(),
        ));
    }

    Ok(audio)
}

/// Split text into word-aligned pieces of at most `max_chars` characters.
///
/// A single word longer than `max_chars` is cut at character boundaries.
pub fn split_for_request(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for part in chars.chunks(max_chars) {
                pieces.push(part.iter().collect());
            }
        } else if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            pieces.push(std::mem::replace(&mut current, word.to_string()));
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

#[async_trait]
impl SpeechProvider for GoogleTranslateProvider {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let pieces = split_for_request(&request.text, MAX_REQUEST_CHARS);
        if pieces.is_empty() {
            return Err(SpeechError::EmptyText);
        }

        log::debug!(
            "Google Translate TTS: lang={} tld={} pieces={}",
            request.language,
            request.accent,
            pieces.len()
        );

        let mut audio = Vec::new();
        for piece in &pieces {
            audio.extend(self.synthesize_piece(piece, request).await?);
        }

        Ok(audio)
    }

    fn name(&self) -> &'static str {
        "google-translate"
    }
}
