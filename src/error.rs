//! Error types for Rail Xinyu

use thiserror::Error;

/// Errors raised by the assessment, therapy and configuration layers
#[derive(Debug, Error)]
pub enum WellnessError {
    #[error("Invalid answer: {0}")]
    InvalidAnswer(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unknown scene: {0}")]
    UnknownScene(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio playback error: {0}")]
    Audio(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the generative AI gateway.
///
/// Views never surface these to the user; they swap in canned responses.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Gateway returned no text")]
    EmptyResponse,

    #[error("Malformed gateway payload: {0}")]
    Malformed(String),

    #[error("Missing API credential")]
    MissingCredential,

    #[error("Gateway is offline")]
    Offline,
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Malformed(err.to_string())
    }
}
