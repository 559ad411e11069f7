//! Voice selection: (language, gender) to synthesis parameters.
//!
//! The speech engine has no gender control. Gender is approximated by picking
//! a regional accent of the same language: US English-style `com` for male,
//! Australian `com.au` for female. Callers observe exactly these two variants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages the speech engine is asked to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "ru")]
    Russian,
}

impl Language {
    pub const ALL: [Language; 11] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Chinese,
        Language::Japanese,
        Language::Korean,
        Language::Hindi,
        Language::Russian,
    ];

    /// Get the ISO 639-1 code as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Chinese => "zh",
            Language::Japanese => "ja",
            Language::Korean => "ko",
            Language::Hindi => "hi",
            Language::Russian => "ru",
        }
    }

    /// Look up a supported language by its exact code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|language| language.as_str() == code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Requested voice gender.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Regional accent used as a stand-in for voice gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccentVariant {
    UnitedStates,
    Australia,
}

impl AccentVariant {
    /// Top-level domain of the Translate host that speaks this accent
    pub fn tld(&self) -> &'static str {
        match self {
            AccentVariant::UnitedStates => "com",
            AccentVariant::Australia => "com.au",
        }
    }
}

impl From<Gender> for AccentVariant {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Male => AccentVariant::UnitedStates,
            Gender::Female => AccentVariant::Australia,
        }
    }
}

/// Parameters handed to the speech engine for every chunk of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceParameters {
    pub language: Language,
    pub accent: AccentVariant,
}

/// Resolve the voice for a requested language code and gender.
///
/// Unknown language codes fall back to English instead of failing.
pub fn resolve_voice(language: &str, gender: Gender) -> VoiceParameters {
    let language = Language::from_code(language).unwrap_or_else(|| {
        log::warn!("Unsupported language '{}', falling back to en", language);
        Language::English
    });

    VoiceParameters {
        language,
        accent: AccentVariant::from(gender),
    }
}
