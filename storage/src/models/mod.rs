//! Persisted entities: users, files, parts and history turns.

mod turn;
mod user_record;

pub use turn::{FileRecord, NewFile, PartContent, PartRecord, Role, Turn, UserTurn};
pub use user_record::{UpsertOutcome, UserRecord};
