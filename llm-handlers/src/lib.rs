//! # LLM handlers
//!
//! Handlers that talk to the model: [`ChatHandler`] answers text and media messages through
//! [`GeminiChat`], [`ClearHistoryHandler`] serves `/clearhistory`.

mod chat_handler;
mod clear_history;
mod gemini_chat;
mod media;
mod mention;

pub use chat_handler::{ChatHandler, DEFAULT_MAX_MEDIA_BYTES, MSG_FILE_TOO_LARGE, MSG_NO_RESPONSE};
pub use clear_history::{ClearHistoryHandler, MSG_CLEAR_DONE, MSG_CLEAR_WAIT};
pub use gemini_chat::{ChatReply, GeminiChat, NO_RESPONSE_PLACEHOLDER};
pub use media::resolve_mime_type;
pub use mention::{is_bot_mentioned, is_command, strip_mention};
