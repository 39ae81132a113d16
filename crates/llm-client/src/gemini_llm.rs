//! Gemini implementation of [`LlmClient`]: wraps gemini-client with the fixed generation
//! parameters and safety settings.

use async_trait::async_trait;
use gemini_client::{
    Content, GeminiClient, GeminiError, GenerateContentRequest, GenerationConfig, Part,
    SafetySetting,
};
use prompt::{ChatPart, ChatTurn, TurnRole};
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

use crate::{Generation, LlmClient, LlmConfig, LlmError, Result, UploadedFile};

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const FILE_POLL_ATTEMPTS: u32 = 30;
const FILE_POLL_INTERVAL: Duration = Duration::from_secs(2);

const SAFETY_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

pub fn default_generation_config() -> GenerationConfig {
    GenerationConfig {
        temperature: Some(1.0),
        top_p: Some(0.95),
        top_k: Some(64),
        max_output_tokens: Some(8192),
        response_mime_type: Some("text/plain".to_string()),
    }
}

/// No content blocking for any harm category.
pub fn default_safety_settings() -> Vec<SafetySetting> {
    SAFETY_CATEGORIES
        .iter()
        .map(|category| SafetySetting::new(*category, "BLOCK_NONE"))
        .collect()
}

/// LlmClient backed by the Gemini REST API.
#[derive(Clone, Debug)]
pub struct GeminiLlmClient {
    client: GeminiClient,
    model: String,
    poll_interval: Duration,
}

impl GeminiLlmClient {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            poll_interval: FILE_POLL_INTERVAL,
        }
    }

    /// Builds a client from config (API key, base URL, model).
    pub fn from_config(config: &dyn LlmConfig) -> Result<Self> {
        let client = GeminiClient::with_base_url(config.api_key(), config.base_url())
            .map_err(|e| LlmError::Request(e.to_string()))?;
        Ok(Self::new(client).with_model(config.model()))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Builds the generateContent body: history then the new message, with the system
    /// instruction, generation config and safety settings.
    pub fn build_request(
        system_prompt: &str,
        history: Vec<ChatTurn>,
        message: ChatTurn,
    ) -> GenerateContentRequest {
        let contents = history
            .into_iter()
            .chain(std::iter::once(message))
            .filter(|turn| !turn.is_empty())
            .map(turn_to_content)
            .collect();
        let system_instruction =
            (!system_prompt.trim().is_empty()).then(|| Content::instruction(system_prompt));
        GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: Some(default_generation_config()),
            safety_settings: default_safety_settings(),
        }
    }
}

fn turn_to_content(turn: ChatTurn) -> Content {
    let parts = turn
        .parts
        .into_iter()
        .map(|part| match part {
            ChatPart::Text(text) => Part::text(text),
            ChatPart::File { mime_type, uri } => Part::file(mime_type, uri),
        })
        .collect();
    match turn.role {
        TurnRole::User => Content::user(parts),
        TurnRole::Model => Content::model(parts),
    }
}

fn generation_error(e: GeminiError) -> LlmError {
    match e {
        GeminiError::Stopped(reason) | GeminiError::Blocked(reason) => {
            LlmError::GenerationStopped(reason)
        }
        other => LlmError::Request(other.to_string()),
    }
}

#[async_trait]
impl LlmClient for GeminiLlmClient {
    #[instrument(skip(self, system_prompt, history, message), fields(model = %self.model, history_len = history.len()))]
    async fn generate(
        &self,
        system_prompt: &str,
        history: Vec<ChatTurn>,
        message: ChatTurn,
    ) -> Result<Generation> {
        let request = Self::build_request(system_prompt, history, message);
        let response = self
            .client
            .generate_content(&self.model, &request)
            .await
            .map_err(generation_error)?;
        Ok(Generation {
            text: response.text(),
            finish_reason: response.finish_reason().map(str::to_string),
        })
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn upload_file(&self, path: &Path, mime_type: &str) -> Result<UploadedFile> {
        let display_name = path.file_name().and_then(|n| n.to_str());
        let file = self
            .client
            .upload_file(path, mime_type, display_name)
            .await
            .map_err(|e| LlmError::Upload(e.to_string()))?;
        let file = self
            .client
            .wait_for_active(file, FILE_POLL_ATTEMPTS, self.poll_interval)
            .await
            .map_err(|e| LlmError::Upload(e.to_string()))?;
        Ok(UploadedFile {
            name: file.name,
            uri: file.uri,
            mime_type: file.mime_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_orders_history_then_message() {
        let history = vec![ChatTurn::user("Hi there"), ChatTurn::model("Oh hi!")];
        let message = ChatTurn::user_message(Some("look"), Some(("image/png", "uri://x")));

        let request = GeminiLlmClient::build_request("Be {name}", history, message);

        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[0].role.as_deref(), Some("user"));
        assert_eq!(request.contents[1].role.as_deref(), Some("model"));
        assert_eq!(
            request.contents[2].parts,
            vec![Part::file("image/png", "uri://x"), Part::text("look")]
        );
        assert_eq!(request.system_instruction, Some(Content::instruction("Be {name}")));
        assert_eq!(request.safety_settings.len(), 4);
        assert!(request
            .safety_settings
            .iter()
            .all(|s| s.threshold == "BLOCK_NONE"));
    }

    #[test]
    fn test_build_request_skips_empty_turns_and_blank_prompt() {
        let request = GeminiLlmClient::build_request(
            "  ",
            vec![ChatTurn::new(TurnRole::Model, vec![])],
            ChatTurn::user("hi"),
        );
        assert_eq!(request.contents.len(), 1);
        assert!(request.system_instruction.is_none());
    }

    #[test]
    fn test_generation_config_values() {
        let config = default_generation_config();
        assert_eq!(config.temperature, Some(1.0));
        assert_eq!(config.top_p, Some(0.95));
        assert_eq!(config.top_k, Some(64));
        assert_eq!(config.max_output_tokens, Some(8192));
        assert_eq!(config.response_mime_type.as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_stop_errors_map_to_generation_stopped() {
        assert!(matches!(
            generation_error(GeminiError::Stopped("SAFETY".into())),
            LlmError::GenerationStopped(_)
        ));
        assert!(matches!(
            generation_error(GeminiError::Blocked("OTHER".into())),
            LlmError::GenerationStopped(_)
        ));
        assert!(matches!(
            generation_error(GeminiError::MissingUploadUrl),
            LlmError::Request(_)
        ));
    }
}
