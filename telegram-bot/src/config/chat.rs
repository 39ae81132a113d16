//! Chat behaviour: rate-limit windows, media size cap, download directory.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_CHAT_COOLDOWN_SECS: u64 = 3;
pub const DEFAULT_CLEAR_HISTORY_COOLDOWN_SECS: u64 = 15;
pub const DEFAULT_MAX_MEDIA_BYTES: u64 = llm_handlers::DEFAULT_MAX_MEDIA_BYTES;

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// CHAT_COOLDOWN_SECS
    pub chat_cooldown_secs: u64,
    /// CLEAR_HISTORY_COOLDOWN_SECS
    pub clear_history_cooldown_secs: u64,
    /// MAX_MEDIA_BYTES
    pub max_media_bytes: u64,
    /// MEDIA_DIR
    pub media_dir: PathBuf,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            chat_cooldown_secs: DEFAULT_CHAT_COOLDOWN_SECS,
            clear_history_cooldown_secs: DEFAULT_CLEAR_HISTORY_COOLDOWN_SECS,
            max_media_bytes: DEFAULT_MAX_MEDIA_BYTES,
            media_dir: default_media_dir(),
        }
    }
}

impl ChatConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            chat_cooldown_secs: parse_var("CHAT_COOLDOWN_SECS", DEFAULT_CHAT_COOLDOWN_SECS)?,
            clear_history_cooldown_secs: parse_var(
                "CLEAR_HISTORY_COOLDOWN_SECS",
                DEFAULT_CLEAR_HISTORY_COOLDOWN_SECS,
            )?,
            max_media_bytes: parse_var("MAX_MEDIA_BYTES", DEFAULT_MAX_MEDIA_BYTES)?,
            media_dir: env::var("MEDIA_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_media_dir),
        })
    }
}

fn default_media_dir() -> PathBuf {
    env::temp_dir().join("gemini-bot")
}

/// Unset or blank → default; present but unparsable → error.
fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .with_context(|| format!("{} is not a valid number: {}", key, value)),
        _ => Ok(default),
    }
}
