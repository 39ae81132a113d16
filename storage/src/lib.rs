//! Storage crate: users and conversation history persisted in SQLite.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – UserRecord, Turn, PartRecord, FileRecord, UserTurn
//! - [`chat_repo`] – ChatRepository (SQLite)
//! - [`sqlite_pool`] – SqlitePoolManager

mod chat_repo;
mod error;
mod models;
mod sqlite_pool;

pub use chat_repo::{ChatRepository, HISTORY_LIMIT};
pub use error::{Result, StorageError};
pub use models::{
    FileRecord, NewFile, PartContent, PartRecord, Role, Turn, UpsertOutcome, UserRecord,
    UserTurn,
};
pub use sqlite_pool::SqlitePoolManager;
