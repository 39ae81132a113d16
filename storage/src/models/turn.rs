//! Conversation turn models: history rows, their ordered parts and file references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StorageError;

/// Author of a turn. Stored as `user` / `model`, the role names of the Gemini API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            other => Err(StorageError::InvalidData(format!("unknown role: {}", other))),
        }
    }
}

/// Vendor-hosted media reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub mime_type: String,
    pub url: String,
}

/// Content of one part: text or a file, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartContent {
    Text(String),
    File(FileRecord),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartRecord {
    pub id: i64,
    /// Zero-based index within the owning turn.
    pub position: i64,
    pub content: PartContent,
}

/// One history row with its parts in `position` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: i64,
    pub chat_id: i64,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub parts: Vec<PartRecord>,
}

impl Turn {
    /// Text parts joined with newlines.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match &p.content {
                PartContent::Text(t) => Some(t.as_str()),
                PartContent::File(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn files(&self) -> impl Iterator<Item = &FileRecord> {
        self.parts.iter().filter_map(|p| match &p.content {
            PartContent::File(f) => Some(f),
            PartContent::Text(_) => None,
        })
    }
}

/// File reference to store with a new user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub mime_type: String,
    pub url: String,
}

/// Content of a new user turn. Stored as file part first, then text part, matching the order
/// in which they are sent to the model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserTurn {
    pub text: Option<String>,
    pub file: Option<NewFile>,
}

impl UserTurn {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            file: None,
        }
    }

    pub fn with_file(mut self, mime_type: impl Into<String>, url: impl Into<String>) -> Self {
        self.file = Some(NewFile {
            mime_type: mime_type.into(),
            url: url.into(),
        });
        self
    }

    /// Text with surrounding whitespace removed; `None` when nothing remains.
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.trimmed_text().is_none() && self.file.is_none()
    }
}
