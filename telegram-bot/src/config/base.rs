//! Base config: Telegram Bot connection, logging, database. Loaded from env.

use anyhow::{Context, Result};
use dbot_telegram::TelegramConfig;
use std::env;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://geminibot.db";

/// Base config: Telegram-related, logging, database only.
#[derive(Clone)]
pub struct BaseConfig {
    pub telegram: TelegramConfig,
    /// DATABASE_URL or DATABASE_URI; SQLite URL or file path.
    pub database_url: String,
}

impl std::fmt::Debug for BaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseConfig")
            .field("telegram", &self.telegram)
            .field("database_url", &self.database_url)
            .finish()
    }
}

impl BaseConfig {
    /// Load from environment variables.
    pub fn load() -> Result<Self> {
        let mut telegram = TelegramConfig::from_env()?;
        telegram.bot_token = telegram.bot_token.trim().to_string();
        if telegram.bot_token.is_empty() {
            anyhow::bail!("BOT_TOKEN is empty");
        }

        Ok(Self {
            telegram,
            database_url: Self::database_url_from_env(),
        })
    }

    /// DATABASE_URL (sqlx form), then DATABASE_URI (SQLAlchemy form), then the default file.
    pub fn database_url_from_env() -> String {
        let non_empty = |key: &str| env::var(key).ok().filter(|s| !s.trim().is_empty());
        non_empty("DATABASE_URL")
            .or_else(|| non_empty("DATABASE_URI").map(|uri| database_uri_to_path(&uri)))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
    }

    /// Validate config (e.g. telegram_api_url must be valid URL if set).
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url_str) = self.telegram.telegram_api_url {
            reqwest::Url::parse(url_str).with_context(|| {
                format!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                )
            })?;
        }
        Ok(())
    }
}

/// SQLAlchemy `sqlite:///x` is the path `x` relative to the working directory and
/// `sqlite:////x` the absolute path `/x`; sqlx would read both as absolute, so they become plain paths.
fn database_uri_to_path(uri: &str) -> String {
    match uri.trim().strip_prefix("sqlite:///") {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => uri.trim().to_string(),
    }
}
