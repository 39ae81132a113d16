//! Chat repository: users and conversation history.
//!
//! Uses SqlitePoolManager and the models (UserRecord, Turn, PartRecord, FileRecord).
//! Every write that touches more than one table runs in a single transaction, so a history row
//! is never visible without its parts.

use crate::error::{Result, StorageError};
use crate::models::{
    FileRecord, PartContent, PartRecord, Role, Turn, UpsertOutcome, UserRecord, UserTurn,
};
use crate::sqlite_pool::SqlitePoolManager;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Upper bound of turns returned by [`ChatRepository::get_recent_turns`].
pub const HISTORY_LIMIT: i64 = 50;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        username TEXT,
        started_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS files (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        mime_type TEXT NOT NULL,
        url TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        chat_id INTEGER NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('user', 'model')),
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS parts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        history_id INTEGER NOT NULL REFERENCES history(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        text TEXT,
        file_id INTEGER REFERENCES files(id),
        CHECK ((text IS NULL) <> (file_id IS NULL))
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_history_chat_id ON history(chat_id, id)",
    "CREATE INDEX IF NOT EXISTS idx_parts_history_id ON parts(history_id, position)",
];

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    chat_id: i64,
    role: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PartRow {
    history_id: i64,
    id: i64,
    position: i64,
    text: Option<String>,
    file_id: Option<i64>,
    mime_type: Option<String>,
    url: Option<String>,
}

impl PartRow {
    fn into_part(self) -> Result<PartRecord> {
        let content = match (self.text, self.file_id, self.mime_type, self.url) {
            (Some(text), None, _, _) => PartContent::Text(text),
            (None, Some(id), Some(mime_type), Some(url)) => PartContent::File(FileRecord {
                id,
                mime_type,
                url,
            }),
            _ => {
                return Err(StorageError::InvalidData(format!(
                    "part {} has neither text nor a resolvable file",
                    self.id
                )))
            }
        };
        Ok(PartRecord {
            id: self.id,
            position: self.position,
            content,
        })
    }
}

#[derive(Clone)]
pub struct ChatRepository {
    pool_manager: SqlitePoolManager,
}

impl ChatRepository {
    /// Opens the database and creates the schema if it does not exist.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<()> {
        info!("Creating database tables if not exist");
        let pool = self.pool_manager.pool();
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        info!("Database setup successful");
        Ok(())
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, username, started_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(user)
    }

    /// Creates the user on first sight, otherwise refreshes name and username.
    /// `started_at` is only ever written by the insert.
    #[instrument(skip(self))]
    pub async fn upsert_user(
        &self,
        id: i64,
        name: &str,
        username: Option<&str>,
    ) -> Result<UpsertOutcome> {
        let inserted = sqlx::query(
            "INSERT INTO users (id, name, username, started_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(id)
        .bind(name)
        .bind(username)
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await?
        .rows_affected();

        if inserted == 1 {
            info!(user_id = id, "Created user");
            return Ok(UpsertOutcome::Created);
        }

        sqlx::query("UPDATE users SET name = ?, username = ? WHERE id = ?")
            .bind(name)
            .bind(username)
            .bind(id)
            .execute(self.pool_manager.pool())
            .await?;
        debug!(user_id = id, "Updated user");
        Ok(UpsertOutcome::Updated)
    }

    /// Stores a user turn: the file part (if any) first, then the trimmed text part (if any).
    #[instrument(skip(self, turn))]
    pub async fn append_user_turn(&self, chat_id: i64, turn: &UserTurn) -> Result<i64> {
        let mut tx = self.pool_manager.pool().begin().await?;
        let id = insert_user_turn(&mut tx, chat_id, turn).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Stores the model's reply (trimmed) as one turn.
    #[instrument(skip(self, text))]
    pub async fn append_model_turn(&self, chat_id: i64, text: &str) -> Result<i64> {
        let mut tx = self.pool_manager.pool().begin().await?;
        let id = insert_model_turn(&mut tx, chat_id, text).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Stores a user turn and the model's reply in one transaction, user turn first.
    #[instrument(skip(self, turn, model_text))]
    pub async fn append_exchange(
        &self,
        chat_id: i64,
        turn: &UserTurn,
        model_text: &str,
    ) -> Result<(i64, i64)> {
        let mut tx = self.pool_manager.pool().begin().await?;
        let user_id = insert_user_turn(&mut tx, chat_id, turn).await?;
        let model_id = insert_model_turn(&mut tx, chat_id, model_text).await?;
        tx.commit().await?;
        info!(chat_id, user_turn = user_id, model_turn = model_id, "Saved exchange");
        Ok((user_id, model_id))
    }

    /// Most recent turn of the chat, parts resolved.
    pub async fn get_latest_turn(&self, chat_id: i64) -> Result<Option<Turn>> {
        Ok(self.fetch_turns(chat_id, 1).await?.pop())
    }

    /// Up to [`HISTORY_LIMIT`] most recent turns in chronological order, parts and files resolved.
    pub async fn get_recent_turns(&self, chat_id: i64) -> Result<Vec<Turn>> {
        let turns = self.fetch_turns(chat_id, HISTORY_LIMIT).await?;
        debug!(chat_id, count = turns.len(), "Loaded history");
        Ok(turns)
    }

    /// Deletes every turn of the chat, their parts, and the files those parts referenced.
    /// Returns the number of turns removed.
    #[instrument(skip(self))]
    pub async fn clear_turns(&self, chat_id: i64) -> Result<u64> {
        let mut tx = self.pool_manager.pool().begin().await?;

        let file_ids: Vec<(i64,)> = sqlx::query_as(
            "SELECT p.file_id FROM parts p JOIN history h ON h.id = p.history_id \
             WHERE h.chat_id = ? AND p.file_id IS NOT NULL",
        )
        .bind(chat_id)
        .fetch_all(&mut *tx)
        .await?;

        let removed = sqlx::query("DELETE FROM history WHERE chat_id = ?")
            .bind(chat_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for (file_id,) in &file_ids {
            sqlx::query("DELETE FROM files WHERE id = ?")
                .bind(file_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!(chat_id, turns = removed, files = file_ids.len(), "Cleared history");
        Ok(removed)
    }

    /// Newest `limit` turns, returned oldest first. Both reads share one transaction so the
    /// parts always belong to the listed turns.
    async fn fetch_turns(&self, chat_id: i64, limit: i64) -> Result<Vec<Turn>> {
        let mut tx = self.pool_manager.pool().begin().await?;

        let mut rows: Vec<HistoryRow> = sqlx::query_as(
            "SELECT id, chat_id, role, created_at FROM history \
             WHERE chat_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(chat_id)
        .bind(limit)
        .fetch_all(&mut *tx)
        .await?;
        rows.reverse();

        let part_rows: Vec<PartRow> = sqlx::query_as(
            "SELECT p.history_id, p.id, p.position, p.text, f.id AS file_id, f.mime_type, f.url \
             FROM parts p LEFT JOIN files f ON f.id = p.file_id \
             WHERE p.history_id IN \
                (SELECT id FROM history WHERE chat_id = ? ORDER BY id DESC LIMIT ?) \
             ORDER BY p.history_id, p.position",
        )
        .bind(chat_id)
        .bind(limit)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut parts: HashMap<i64, Vec<PartRecord>> = HashMap::new();
        for row in part_rows {
            let history_id = row.history_id;
            parts.entry(history_id).or_default().push(row.into_part()?);
        }

        rows.into_iter()
            .map(|row| {
                Ok(Turn {
                    id: row.id,
                    chat_id: row.chat_id,
                    role: row.role.parse()?,
                    created_at: row.created_at,
                    parts: parts.remove(&row.id).unwrap_or_default(),
                })
            })
            .collect()
    }
}

async fn insert_history(tx: &mut Transaction<'_, Sqlite>, chat_id: i64, role: Role) -> Result<i64> {
    let id = sqlx::query("INSERT INTO history (chat_id, role, created_at) VALUES (?, ?, ?)")
        .bind(chat_id)
        .bind(role.as_str())
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?
        .last_insert_rowid();
    Ok(id)
}

async fn insert_text_part(
    tx: &mut Transaction<'_, Sqlite>,
    history_id: i64,
    position: i64,
    text: &str,
) -> Result<()> {
    sqlx::query("INSERT INTO parts (history_id, position, text) VALUES (?, ?, ?)")
        .bind(history_id)
        .bind(position)
        .bind(text)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn insert_user_turn(
    tx: &mut Transaction<'_, Sqlite>,
    chat_id: i64,
    turn: &UserTurn,
) -> Result<i64> {
    if turn.is_empty() {
        return Err(StorageError::InvalidData(
            "user turn has neither text nor file".to_string(),
        ));
    }

    let history_id = insert_history(tx, chat_id, Role::User).await?;
    let mut position = 0;

    if let Some(file) = &turn.file {
        let file_id = sqlx::query("INSERT INTO files (mime_type, url) VALUES (?, ?)")
            .bind(&file.mime_type)
            .bind(&file.url)
            .execute(&mut **tx)
            .await?
            .last_insert_rowid();
        sqlx::query("INSERT INTO parts (history_id, position, file_id) VALUES (?, ?, ?)")
            .bind(history_id)
            .bind(position)
            .bind(file_id)
            .execute(&mut **tx)
            .await?;
        position += 1;
    }

    if let Some(text) = turn.trimmed_text() {
        insert_text_part(tx, history_id, position, text).await?;
    }

    Ok(history_id)
}

async fn insert_model_turn(
    tx: &mut Transaction<'_, Sqlite>,
    chat_id: i64,
    text: &str,
) -> Result<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(StorageError::InvalidData("model turn is empty".to_string()));
    }
    let history_id = insert_history(tx, chat_id, Role::Model).await?;
    insert_text_part(tx, history_id, 0, text).await?;
    Ok(history_id)
}
