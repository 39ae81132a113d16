//! Gemini client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The candidate finished for a reason other than a normal stop (e.g. SAFETY, RECITATION).
    #[error("Generation stopped: {0}")]
    Stopped(String),

    /// The prompt itself was blocked; no candidate was produced.
    #[error("Prompt blocked: {0}")]
    Blocked(String),

    #[error("Upload session did not return an upload URL")]
    MissingUploadUrl,

    #[error("File {0} failed processing")]
    FileProcessingFailed(String),

    #[error("File {0} is not active after polling")]
    FileNotReady(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeminiError {
    /// True for the failures where the model declined to generate.
    pub fn is_generation_stop(&self) -> bool {
        matches!(self, GeminiError::Stopped(_) | GeminiError::Blocked(_))
    }
}
