//! # dbot-core
//!
//! Core types and traits for the bot: [`Bot`], [`Handler`], message, media and user types,
//! and tracing initialization. Transport-agnostic; used by dbot-telegram, handler-chain and the handlers.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::{parse_message_id, Bot};
pub use error::{DbotError, HandlerError, Result};
pub use logger::{init_tracing, DEFAULT_LOG_FILTER};
pub use types::{
    Chat, Handler, HandlerResponse, MediaAttachment, MediaKind, Message, TextFormat,
    ToCoreMessage, ToCoreUser, User,
};
