//! Conversation wrapper: rebuilds the chat from stored history, calls the model, and
//! persists the exchange once the model has answered.

use std::sync::Arc;

use dbot_core::{DbotError, HandlerError, Result};
use llm_client::{LlmClient, LlmError};
use prompt::{render_system_prompt, seed_examples, ChatPart, ChatTurn, TurnRole};
use storage::{ChatRepository, PartContent, Role, Turn, UserTurn};
use tracing::{debug, error, info, instrument};

/// Stored as the model turn when the model returns no text.
pub const NO_RESPONSE_PLACEHOLDER: &str = "*ignores you*";

/// Outcome of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    /// False when the model produced no text and the placeholder was stored instead.
    pub generated: bool,
}

#[derive(Clone)]
pub struct GeminiChat {
    repo: ChatRepository,
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl GeminiChat {
    /// `system_prompt` is a template; `{name}` is replaced with the sender's name per call.
    pub fn new(repo: ChatRepository, llm: Arc<dyn LlmClient>, system_prompt: String) -> Self {
        Self {
            repo,
            llm,
            system_prompt,
        }
    }

    /// Seed example turns followed by the chat's stored turns, oldest first.
    pub async fn build_history(&self, chat_id: i64) -> Result<Vec<ChatTurn>> {
        let stored = self
            .repo
            .get_recent_turns(chat_id)
            .await
            .map_err(|e| DbotError::Database(e.to_string()))?;
        debug!(chat_id, count = stored.len(), "Loaded stored turns");

        let mut history = seed_examples();
        history.extend(stored.iter().map(stored_turn_to_chat));
        Ok(history)
    }

    /// Sends `message` to the model with the chat's history and stores both turns when the
    /// model answers. Nothing is stored when the call fails.
    #[instrument(skip(self, message), fields(chat_id = chat_id))]
    pub async fn get_response(
        &self,
        chat_id: i64,
        name: &str,
        message: &UserTurn,
    ) -> Result<ChatReply> {
        if message.is_empty() {
            return Err(HandlerError::EmptyContent.into());
        }

        let history = self.build_history(chat_id).await?;
        let system_prompt = render_system_prompt(&self.system_prompt, name);
        let file = message
            .file
            .as_ref()
            .map(|f| (f.mime_type.as_str(), f.url.as_str()));
        let turn = ChatTurn::user_message(message.trimmed_text(), file);

        let generation = match self.llm.generate(&system_prompt, history, turn).await {
            Ok(generation) => generation,
            Err(LlmError::GenerationStopped(reason)) => {
                error!(chat_id, reason = %reason, "Model stopped generating");
                return Err(HandlerError::GenerationStopped(reason).into());
            }
            Err(e) => {
                error!(chat_id, error = %e, "Model request failed");
                return Err(DbotError::Llm(e.to_string()));
            }
        };

        let generated = !generation.is_empty();
        let model_text = if generated {
            generation.text
        } else {
            NO_RESPONSE_PLACEHOLDER.to_string()
        };

        self.repo
            .append_exchange(chat_id, message, &model_text)
            .await
            .map_err(|e| {
                error!(chat_id, error = %e, "Failed to store exchange");
                DbotError::Database(e.to_string())
            })?;

        if generated {
            debug!(chat_id, "Generated response");
        } else {
            info!(chat_id, name = %name, "No response to message");
        }

        Ok(ChatReply {
            text: model_text,
            generated,
        })
    }

    /// Removes every stored turn of the chat; returns how many were removed.
    pub async fn clear_history(&self, chat_id: i64) -> Result<u64> {
        self.repo
            .clear_turns(chat_id)
            .await
            .map_err(|e| DbotError::Database(e.to_string()))
    }
}

/// Stored turn → prompt turn: text parts stay text, file parts become file references.
fn stored_turn_to_chat(turn: &Turn) -> ChatTurn {
    let role = match turn.role {
        Role::User => TurnRole::User,
        Role::Model => TurnRole::Model,
    };
    let parts = turn
        .parts
        .iter()
        .map(|part| match &part.content {
            PartContent::Text(text) => ChatPart::text(text.clone()),
            PartContent::File(file) => ChatPart::file(file.mime_type.clone(), file.url.clone()),
        })
        .collect();
    ChatTurn::new(role, parts)
}
