//! Wraps teloxide::Bot and implements [`dbot_core::Bot`]. Production code sends messages via Telegram; tests can substitute another Bot impl.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dbot_core::{parse_message_id, Bot as CoreBot, Chat, DbotError, Message, Result, TextFormat};
use teloxide::net::Download;
use teloxide::types::{
    ChatAction, ChatId, FileId, LinkPreviewOptions, MessageId, ParseMode, ReplyParameters,
};
use teloxide::{prelude::*, RequestError};
use tracing::debug;

/// Thin wrapper around teloxide::Bot that implements dbot-core's Bot trait.
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

fn bot_error(e: RequestError) -> DbotError {
    DbotError::Bot(e.to_string())
}

#[allow(deprecated)]
fn parse_mode(format: TextFormat) -> Option<ParseMode> {
    match format {
        TextFormat::Plain => None,
        TextFormat::Markdown => Some(ParseMode::Markdown),
        TextFormat::Html => Some(ParseMode::Html),
    }
}

/// Replies go out without link previews.
fn no_link_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String> {
        let sent = self
            .bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(bot_error)?;
        Ok(sent.id.0.to_string())
    }

    async fn reply_to(&self, message: &Message, text: &str, format: TextFormat) -> Result<()> {
        let mut request = self
            .bot
            .send_message(ChatId(message.chat.id), text.to_string())
            .link_preview_options(no_link_preview());
        if let Ok(id) = parse_message_id(&message.id) {
            request = request.reply_parameters(ReplyParameters::new(MessageId(id)));
        }
        if let Some(mode) = parse_mode(format) {
            request = request.parse_mode(mode);
        }
        request.await.map_err(bot_error)?;
        Ok(())
    }

    async fn edit_message(&self, chat: &Chat, message_id: &str, text: &str) -> Result<()> {
        let id = parse_message_id(message_id)?;
        self.bot
            .edit_message_text(ChatId(chat.id), MessageId(id), text)
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn send_typing(&self, chat: &Chat) -> Result<()> {
        self.bot
            .send_chat_action(ChatId(chat.id), ChatAction::Typing)
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn download_file(&self, file_id: &str, dir: &Path) -> Result<PathBuf> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_string()))
            .await
            .map_err(bot_error)?;

        let extension = Path::new(&file.path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let local = dir.join(format!("{}.{}", uuid::Uuid::new_v4(), extension));

        let mut dst = tokio::fs::File::create(&local).await?;
        if let Err(e) = self.bot.download_file(&file.path, &mut dst).await {
            drop(dst);
            let _ = tokio::fs::remove_file(&local).await;
            return Err(DbotError::Bot(e.to_string()));
        }
        debug!(remote = %file.path, local = %local.display(), "Downloaded file");
        Ok(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dbot_core::User;
    use mockito::Matcher;
    use serde_json::json;

    fn incoming(id: &str) -> Message {
        Message {
            id: id.to_string(),
            user: User {
                id: 42,
                username: None,
                first_name: Some("Alice".to_string()),
                last_name: None,
            },
            chat: Chat {
                id: 42,
                chat_type: "private".to_string(),
            },
            content: "links please".to_string(),
            caption: None,
            media: None,
            message_type: "text".to_string(),
            created_at: Utc::now(),
            reply_to_message_id: None,
            reply_to_user: None,
        }
    }

    /// **Test: reply_to quotes the incoming message and disables link previews.**
    #[tokio::test]
    async fn test_reply_to_disables_link_preview() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex(r"(?i)^/bot[^/]+/sendmessage$".to_string()))
            .match_body(Matcher::PartialJson(json!({
                "chat_id": 42,
                "text": "see https://example.com",
                "link_preview_options": {"is_disabled": true},
                "reply_parameters": {"message_id": 7}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "ok": true,
                    "result": {
                        "message_id": 8,
                        "date": 1_700_000_000,
                        "chat": {"id": 42, "type": "private", "first_name": "Alice"},
                        "text": "see https://example.com"
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let url = reqwest::Url::parse(&server.url()).unwrap();
        let adapter = TelegramBotAdapter::new(teloxide::Bot::new("123:TEST").set_api_url(url));

        adapter
            .reply_to(&incoming("7"), "see https://example.com", TextFormat::Plain)
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
