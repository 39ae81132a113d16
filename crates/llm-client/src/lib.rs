//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait and a Gemini implementation. Transport-agnostic;
//! used by llm-handlers and telegram-bot.

use async_trait::async_trait;
use prompt::ChatTurn;
use std::path::Path;
use thiserror::Error;

mod config;
mod gemini_llm;

pub use config::{load_system_prompt, EnvLlmConfig, LlmConfig};
pub use gemini_llm::{
    default_generation_config, default_safety_settings, GeminiLlmClient, DEFAULT_MODEL,
};

#[derive(Error, Debug)]
pub enum LlmError {
    /// The model refused or stopped generating (safety, recitation, blocked prompt).
    #[error("Generation stopped: {0}")]
    GenerationStopped(String),

    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("File upload failed: {0}")]
    Upload(String),
}

pub type Result<T> = std::result::Result<T, LlmError>;

/// Text produced by one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub finish_reason: Option<String>,
}

impl Generation {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: None,
        }
    }

    /// True when the model produced no usable text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A file hosted by the model vendor, ready to be referenced from a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub uri: String,
    pub mime_type: String,
}

/// LLM client interface: one chat generation, and media upload for file parts.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates the model reply to `message`, given the system prompt and prior turns
    /// (oldest first).
    async fn generate(
        &self,
        system_prompt: &str,
        history: Vec<ChatTurn>,
        message: ChatTurn,
    ) -> Result<Generation>;

    /// Uploads a local file so it can be referenced by URI; returns once it is usable.
    async fn upload_file(&self, path: &Path, mime_type: &str) -> Result<UploadedFile>;
}
