//! pdf2audio configuration management.

use crate::text::DEFAULT_MAX_LENGTH;
use crate::tts::{Gender, MIN_TEXT_LENGTH};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_MIN_OUTPUT_BYTES: usize = 1024;
const DEFAULT_PREVIEW_CHARS: usize = 1500;
const DEFAULT_MAX_INPUT_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default language code (unsupported codes fall back to "en")
    #[serde(default = "default_language")]
    pub language: String,

    /// Default voice gender (male or female)
    #[serde(default)]
    pub gender: Gender,

    /// Maximum characters per synthesis request
    #[serde(default = "default_max_chunk_length")]
    pub max_chunk_length: usize,

    /// Text shorter than this is not worth synthesizing
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,

    /// Output at or below this size is treated as a failed synthesis
    #[serde(default = "default_min_output_bytes")]
    pub min_output_bytes: usize,

    /// Characters kept for a preview clip
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Largest input file accepted
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,

    /// Timeout for each request to the speech service
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// FFmpeg executable. None means look it up on PATH.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_max_chunk_length() -> usize {
    DEFAULT_MAX_LENGTH
}

fn default_min_text_length() -> usize {
    MIN_TEXT_LENGTH
}

fn default_min_output_bytes() -> usize {
    DEFAULT_MIN_OUTPUT_BYTES
}

fn default_preview_chars() -> usize {
    DEFAULT_PREVIEW_CHARS
}

fn default_max_input_bytes() -> u64 {
    DEFAULT_MAX_INPUT_BYTES
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            gender: Gender::default(),
            max_chunk_length: default_max_chunk_length(),
            min_text_length: default_min_text_length(),
            min_output_bytes: default_min_output_bytes(),
            preview_chars: default_preview_chars(),
            max_input_bytes: default_max_input_bytes(),
            request_timeout_secs: default_request_timeout_secs(),
            ffmpeg_path: None,
        }
    }
}

impl Config {
    /// Get the config file path: <config dir>/pdf2audio/config.toml
    pub fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not determine config directory")?;
        Ok(base.join("pdf2audio").join("config.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}
