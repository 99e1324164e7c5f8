//! Error types for speakr

use std::io;
use thiserror::Error;

/// Main error type for speakr
#[derive(Error, Debug)]
pub enum SpeakrError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Engine not available: {0}")]
    EngineUnavailable(String),

    #[error("No TTS engines available. Install espeak-ng, festival, or speech-dispatcher")]
    NoEngines,

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for speakr operations
pub type Result<T> = std::result::Result<T, SpeakrError>;

impl From<String> for SpeakrError {
    fn from(s: String) -> Self {
        SpeakrError::Other(s)
    }
}

impl From<&str> for SpeakrError {
    fn from(s: &str) -> Self {
        SpeakrError::Other(s.to_string())
    }
}

impl From<ureq::Error> for SpeakrError {
    fn from(e: ureq::Error) -> Self {
        SpeakrError::Network(e.to_string())
    }
}
