//! BotConfig: BaseConfig + LLM config + ChatConfig. Use load() for env-based loading.

use anyhow::Result;
use llm_client::EnvLlmConfig;

use super::{BaseConfig, ChatConfig};

/// Bot config. Use BotConfig::load() for env-based loading.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub base: BaseConfig,
    pub llm: EnvLlmConfig,
    pub chat: ChatConfig,
}

impl BotConfig {
    /// Load full config from environment variables.
    /// Call validate() after load to check config before init.
    pub fn load() -> Result<Self> {
        let base = BaseConfig::load()?;
        let llm = EnvLlmConfig::from_env()?;
        let chat = ChatConfig::from_env()?;
        Ok(Self { base, llm, chat })
    }

    /// Validate config. Call after load() to fail fast before init.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()
    }

    pub fn bot_token(&self) -> &str {
        &self.base.telegram.bot_token
    }
    pub fn database_url(&self) -> &str {
        &self.base.database_url
    }
    pub fn log_file(&self) -> &str {
        &self.base.telegram.log_file
    }
    pub fn telegram_api_url(&self) -> Option<&str> {
        self.base.telegram.telegram_api_url.as_deref()
    }
}
