use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    #[error("No text to synthesize")]
    EmptyText,

    #[error("Text too short to synthesize: {length} characters (minimum {minimum})")]
    TextTooShort { length: usize, minimum: usize },

    #[error("Speech service unreachable: {0}")]
    Unreachable(String),

    #[error("Speech service rejected the request{}: {message}", status.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    Rejected {
        status: Option<u16>,
        message: String,
    },

    #[error("Malformed response from speech service: {0}")]
    MalformedResponse(String),
}

pub type Result<T> = std::result::Result<T, SpeechError>;
