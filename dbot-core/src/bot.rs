//! Bot abstraction for sending, editing, typing and downloading.
//!
//! [`Bot`] is transport-agnostic; the Telegram implementation lives in dbot-telegram.

use crate::error::{DbotError, Result};
use crate::types::{Chat, Message, TextFormat};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Abstraction over the messaging transport. Tests substitute a mock implementation.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a plain text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;
    /// Replies to the given message (same chat, quoting it) with the given formatting.
    async fn reply_to(&self, message: &Message, text: &str, format: TextFormat) -> Result<()>;
    /// Sends a message and returns its id for a later `edit_message`.
    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String>;
    /// Edits an already-sent message. `message_id` is transport-specific (Telegram numeric string).
    async fn edit_message(&self, chat: &Chat, message_id: &str, text: &str) -> Result<()>;
    /// Shows the "typing" indicator in the chat.
    async fn send_typing(&self, chat: &Chat) -> Result<()>;
    /// Downloads the file behind `file_id` into `dir` and returns the local path.
    /// The local file name keeps the remote extension so MIME guessing works.
    async fn download_file(&self, file_id: &str, dir: &Path) -> Result<PathBuf>;
}

/// Parses a message id string into an i32. Used by edit_message.
pub fn parse_message_id(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| DbotError::Bot(format!("Invalid message_id for edit: {}", s)))
}
