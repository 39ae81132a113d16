//! `/clearhistory`: wipes the sender's stored conversation.

use std::sync::Arc;

use async_trait::async_trait;
use dbot_core::{Bot, Handler, HandlerResponse, Message, Result};
use middleware::RateLimiter;
use tracing::{debug, info, instrument, warn};

use crate::gemini_chat::GeminiChat;

pub const CLEAR_HISTORY_COMMAND: &str = "/clearhistory";
pub const MSG_CLEAR_WAIT: &str = "Please wait...";
pub const MSG_CLEAR_DONE: &str = "Done.";

#[derive(Clone)]
pub struct ClearHistoryHandler {
    bot: Arc<dyn Bot>,
    chat: GeminiChat,
    limiter: Arc<RateLimiter>,
}

impl ClearHistoryHandler {
    pub fn new(bot: Arc<dyn Bot>, chat: GeminiChat, limiter: Arc<RateLimiter>) -> Self {
        Self { bot, chat, limiter }
    }

    /// Matches `/clearhistory` and `/clearhistory@anybot`, with optional trailing arguments.
    pub fn is_clear_command(text: &str) -> bool {
        let command = text.split_whitespace().next().unwrap_or_default();
        let name = command.split('@').next().unwrap_or_default();
        name.eq_ignore_ascii_case(CLEAR_HISTORY_COMMAND)
    }
}

#[async_trait]
impl Handler for ClearHistoryHandler {
    #[instrument(skip(self, message), fields(user_id = message.user.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if !message.chat.is_private() || !Self::is_clear_command(&message.content) {
            return Ok(HandlerResponse::Continue);
        }

        if !self.limiter.try_acquire(message.user.id) {
            debug!(user_id = message.user.id, "Rate limited");
            return Ok(HandlerResponse::Stop);
        }

        let status_id = self
            .bot
            .send_message_and_return_id(&message.chat, MSG_CLEAR_WAIT)
            .await?;

        let removed = self.chat.clear_history(message.user.id).await?;
        info!(user_id = message.user.id, removed, "Cleared history");

        if let Err(e) = self
            .bot
            .edit_message(&message.chat, &status_id, MSG_CLEAR_DONE)
            .await
        {
            warn!(error = %e, "Failed to edit status message, sending new one");
            self.bot.send_message(&message.chat, MSG_CLEAR_DONE).await?;
        }

        Ok(HandlerResponse::Reply(MSG_CLEAR_DONE.to_string()))
    }
}
