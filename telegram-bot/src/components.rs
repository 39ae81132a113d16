//! Component factory: builds BotComponents from config. Isolates assembly logic from runner.

use anyhow::{Context, Result};
use dbot_core::Bot as CoreBot;
use dbot_telegram::{build_bot, TelegramBotAdapter};
use handler_chain::HandlerChain;
use llm_client::{GeminiLlmClient, LlmClient, LlmConfig};
use llm_handlers::{ChatHandler, ClearHistoryHandler, GeminiChat};
use middleware::{LoggingHandler, RateLimiter, UserSyncHandler};
use std::sync::Arc;
use storage::ChatRepository;
use tracing::{error, info, instrument};

use super::config::BotConfig;

/// Core dependencies for run_bot; produced by the component factory.
#[derive(Clone)]
pub struct BotComponents {
    pub repo: ChatRepository,
    pub teloxide_bot: teloxide::Bot,
    /// Bot used by handlers; the Telegram adapter unless overridden (tests).
    pub handler_bot: Arc<dyn CoreBot>,
    pub bot_username: Arc<tokio::sync::RwLock<Option<String>>>,
    pub llm_client: Arc<dyn LlmClient>,
    pub gemini_chat: GeminiChat,
    pub chat_limiter: Arc<RateLimiter>,
    pub clear_history_limiter: Arc<RateLimiter>,
}

/// Opens the history database, creating the schema if needed.
#[instrument(skip(config))]
pub async fn open_repository(config: &BotConfig) -> Result<ChatRepository> {
    ChatRepository::new(config.database_url())
        .await
        .map_err(|e| {
            error!(
                error = %e,
                database_url = %config.database_url(),
                "Failed to initialize chat storage"
            );
            anyhow::anyhow!("Failed to initialize chat storage: {}", e)
        })
}

/// Builds BotComponents. `handler_bot_override` and `llm_override` replace the Telegram
/// adapter and the Gemini client (used by integration tests).
#[instrument(skip(config, handler_bot_override, llm_override))]
pub async fn build_bot_components(
    config: &BotConfig,
    handler_bot_override: Option<Arc<dyn CoreBot>>,
    llm_override: Option<Arc<dyn LlmClient>>,
) -> Result<BotComponents> {
    let repo = open_repository(config).await?;

    let teloxide_bot = build_bot(&config.base.telegram)?;
    let handler_bot = handler_bot_override
        .unwrap_or_else(|| Arc::new(TelegramBotAdapter::new(teloxide_bot.clone())));

    let llm_client: Arc<dyn LlmClient> = match llm_override {
        Some(client) => client,
        None => {
            info!(
                model = %config.llm.model(),
                base_url = %config.llm.base_url(),
                "Using Gemini client"
            );
            Arc::new(
                GeminiLlmClient::from_config(&config.llm)
                    .context("Failed to build Gemini client")?,
            )
        }
    };

    let gemini_chat = GeminiChat::new(
        repo.clone(),
        llm_client.clone(),
        config.llm.system_prompt().to_string(),
    );

    Ok(BotComponents {
        repo,
        teloxide_bot,
        handler_bot,
        bot_username: Arc::new(tokio::sync::RwLock::new(None)),
        llm_client,
        gemini_chat,
        chat_limiter: Arc::new(RateLimiter::from_secs(config.chat.chat_cooldown_secs)),
        clear_history_limiter: Arc::new(RateLimiter::from_secs(
            config.chat.clear_history_cooldown_secs,
        )),
    })
}

/// Builds the handler chain (logging → user sync → /clearhistory → chat).
pub fn build_handler_chain(config: &BotConfig, components: &BotComponents) -> HandlerChain {
    let clear_history = ClearHistoryHandler::new(
        components.handler_bot.clone(),
        components.gemini_chat.clone(),
        components.clear_history_limiter.clone(),
    );
    let chat = ChatHandler::new(
        components.handler_bot.clone(),
        components.gemini_chat.clone(),
        components.llm_client.clone(),
        components.chat_limiter.clone(),
        components.bot_username.clone(),
    )
    .with_media_dir(config.chat.media_dir.clone())
    .with_max_media_bytes(config.chat.max_media_bytes);

    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(UserSyncHandler::new(components.repo.clone())))
        .add_handler(Arc::new(clear_history))
        .add_handler(Arc::new(chat))
}
