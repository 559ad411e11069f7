//! Speech synthesis client library for the pdf2audio workspace
//!
//! Provides a single interface over text-to-speech engines:
//! - Google Translate TTS (network, MP3 output)
//! - Mock (scripted, for tests)

pub mod error;
pub mod provider;
pub mod providers;

pub use error::{Result, SpeechError};
pub use provider::{SpeechProvider, SpeechRequest};
pub use providers::{GoogleTranslateProvider, MockProvider};
