//! LLM configuration: trait and env-based implementation.

use anyhow::{Context, Result};
use std::env;
use std::path::Path;

use gemini_client::DEFAULT_BASE_URL;
use prompt::DEFAULT_SYSTEM_PROMPT;

use crate::DEFAULT_MODEL;

/// Default location of the system prompt template.
pub const DEFAULT_SYSTEM_PROMPT_FILE: &str = "ai.prompt";

/// LLM configuration interface for the Gemini API.
pub trait LlmConfig: Send + Sync {
    fn api_key(&self) -> &str;
    fn base_url(&self) -> &str;
    fn model(&self) -> &str;
    /// System prompt template; may contain `{name}`.
    fn system_prompt(&self) -> &str;
}

/// LLM config loaded from environment variables.
#[derive(Clone)]
pub struct EnvLlmConfig {
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub system_prompt: String,
}

impl std::fmt::Debug for EnvLlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvLlmConfig")
            .field("gemini_api_key", &gemini_client::mask_token(&self.gemini_api_key))
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_model", &self.gemini_model)
            .field("system_prompt_len", &self.system_prompt.len())
            .finish()
    }
}

impl LlmConfig for EnvLlmConfig {
    fn api_key(&self) -> &str {
        &self.gemini_api_key
    }
    fn base_url(&self) -> &str {
        &self.gemini_base_url
    }
    fn model(&self) -> &str {
        &self.gemini_model
    }
    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

impl EnvLlmConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let gemini_api_key = env::var("GEMINI_API_KEY").context("GEMINI_API_KEY not set")?;
        let gemini_base_url = non_empty_var("GEMINI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let gemini_model =
            non_empty_var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let prompt_file = non_empty_var("SYSTEM_PROMPT_FILE")
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT_FILE.to_string());
        let system_prompt =
            load_system_prompt(non_empty_var("SYSTEM_PROMPT"), Path::new(&prompt_file));
        Ok(Self {
            gemini_api_key,
            gemini_base_url,
            gemini_model,
            system_prompt,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

/// Resolves the system prompt template: inline value, else the file's content,
/// else [`DEFAULT_SYSTEM_PROMPT`].
pub fn load_system_prompt(inline: Option<String>, file: &Path) -> String {
    if let Some(prompt) = inline {
        return prompt;
    }
    match std::fs::read_to_string(file) {
        Ok(content) if !content.trim().is_empty() => content,
        Ok(_) => {
            tracing::warn!(path = %file.display(), "System prompt file is empty, using default");
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
        Err(e) => {
            tracing::warn!(
                path = %file.display(),
                error = %e,
                "System prompt file not readable, using default"
            );
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
    }
}
