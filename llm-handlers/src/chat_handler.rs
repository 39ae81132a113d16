//! Answers private messages and group mentions with the model's reply.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use dbot_core::{
    Bot, DbotError, Handler, HandlerError, HandlerResponse, MediaAttachment, Message, Result,
    TextFormat,
};
use llm_client::LlmClient;
use middleware::RateLimiter;
use storage::UserTurn;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::gemini_chat::GeminiChat;
use crate::media::resolve_mime_type;
use crate::mention::{is_bot_mentioned, is_command, strip_mention};

pub const DEFAULT_MAX_MEDIA_BYTES: u64 = 10_000_000;

pub const MSG_FILE_TOO_LARGE: &str = "File size is too large. Maximum file size is 10MB.";
pub const MSG_NO_RESPONSE: &str = "*AI did not respond*";

/// Chat handler: filters addressed messages, resolves media, asks [`GeminiChat`] and replies.
///
/// Steps: chat filter → text/command → size cap → rate limit → typing → media upload →
/// model call → reply (Markdown, plain on failure).
#[derive(Clone)]
pub struct ChatHandler {
    bot: Arc<dyn Bot>,
    chat: GeminiChat,
    llm: Arc<dyn LlmClient>,
    limiter: Arc<RateLimiter>,
    bot_username: Arc<RwLock<Option<String>>>,
    media_dir: PathBuf,
    max_media_bytes: u64,
}

/// Text and media extracted from an addressed message.
struct Request<'a> {
    text: Option<String>,
    media: Option<&'a MediaAttachment>,
}

impl ChatHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        chat: GeminiChat,
        llm: Arc<dyn LlmClient>,
        limiter: Arc<RateLimiter>,
        bot_username: Arc<RwLock<Option<String>>>,
    ) -> Self {
        Self {
            bot,
            chat,
            llm,
            limiter,
            bot_username,
            media_dir: std::env::temp_dir().join("gemini-bot"),
            max_media_bytes: DEFAULT_MAX_MEDIA_BYTES,
        }
    }

    pub fn with_media_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.media_dir = dir.into();
        self
    }

    pub fn with_max_media_bytes(mut self, max: u64) -> Self {
        self.max_media_bytes = max;
        self
    }

    async fn get_bot_username(&self) -> Option<String> {
        self.bot_username.read().await.clone()
    }

    /// Private chats always; groups only when this bot is @mentioned or its message is replied to.
    fn is_addressed(message: &Message, bot_username: Option<&str>) -> bool {
        if message.chat.is_private() {
            return true;
        }
        if !message.chat.is_group() {
            return false;
        }
        bot_username.is_some_and(|name| {
            message.is_reply_to(name)
                || is_bot_mentioned(&message.content, name)
                || message
                    .caption
                    .as_deref()
                    .is_some_and(|c| is_bot_mentioned(c, name))
        })
    }

    /// Returns None when the message is not for this handler (command, nothing to send).
    fn extract_request<'a>(
        message: &'a Message,
        bot_username: Option<&str>,
    ) -> Option<Request<'a>> {
        let clean = |text: &str| match bot_username {
            Some(name) => strip_mention(text, name),
            None => text.trim().to_string(),
        };

        let mut text = Some(clean(&message.content)).filter(|t| !t.is_empty());
        if text.as_deref().is_some_and(is_command) {
            return None;
        }

        let media = message.media.as_ref();
        if media.is_some() && text.is_none() {
            text = message
                .caption
                .as_deref()
                .map(clean)
                .filter(|t| !t.is_empty());
        }

        if media.is_none() && text.is_none() {
            return None;
        }
        Some(Request { text, media })
    }

    /// Downloads, uploads to the model vendor and deletes the local copy.
    /// Returns `(mime_type, uri)`.
    async fn upload_media(&self, media: &MediaAttachment) -> Result<(String, String)> {
        tokio::fs::create_dir_all(&self.media_dir).await?;
        let path = self.bot.download_file(&media.file_id, &self.media_dir).await?;
        let mime_type = resolve_mime_type(media.mime_type.as_deref(), &path);
        debug!(path = %path.display(), mime_type = %mime_type, "Downloaded media");

        let uploaded = self.llm.upload_file(&path, &mime_type).await;

        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %e, "Failed to remove downloaded media");
        }

        let file = uploaded.map_err(|e| {
            error!(error = %e, "Media upload failed");
            DbotError::from(HandlerError::MediaUpload(e.to_string()))
        })?;
        Ok((mime_type, file.uri))
    }

    async fn send_reply(&self, message: &Message, text: &str) -> Result<()> {
        match self.bot.reply_to(message, text, TextFormat::Markdown).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Markdown reply failed, sending plain text");
                self.bot.reply_to(message, text, TextFormat::Plain).await
            }
        }
    }
}

#[async_trait]
impl Handler for ChatHandler {
    #[instrument(skip(self, message), fields(user_id = message.user.id, chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let bot_username = self.get_bot_username().await;

        if !Self::is_addressed(message, bot_username.as_deref()) {
            return Ok(HandlerResponse::Ignore);
        }

        let Some(request) = Self::extract_request(message, bot_username.as_deref()) else {
            return Ok(HandlerResponse::Ignore);
        };

        if let Some(media) = request.media {
            if media.file_size > self.max_media_bytes {
                info!(size = media.file_size, "Rejecting oversized media");
                self.bot
                    .reply_to(message, MSG_FILE_TOO_LARGE, TextFormat::Plain)
                    .await?;
                return Ok(HandlerResponse::Stop);
            }
        }

        if !self.limiter.try_acquire(message.user.id) {
            debug!(user_id = message.user.id, "Rate limited");
            return Ok(HandlerResponse::Stop);
        }

        if let Err(e) = self.bot.send_typing(&message.chat).await {
            debug!(error = %e, "Failed to send typing action");
        }

        let mut turn = UserTurn {
            text: request.text,
            file: None,
        };
        if let Some(media) = request.media {
            let (mime_type, uri) = self.upload_media(media).await?;
            turn = turn.with_file(mime_type, uri);
        }

        let name = message.user.display_name();
        let reply = self.chat.get_response(message.user.id, &name, &turn).await?;

        if !reply.generated {
            info!(name = %name, "No response to message");
            self.bot
                .reply_to(message, MSG_NO_RESPONSE, TextFormat::Plain)
                .await?;
            return Ok(HandlerResponse::Stop);
        }

        self.send_reply(message, &reply.text).await?;
        Ok(HandlerResponse::Reply(reply.text))
    }
}
