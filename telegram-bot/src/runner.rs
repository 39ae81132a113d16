//! Entry points: run the bot, or only initialise the database.

use anyhow::Result;
use dbot_core::init_tracing;
use dbot_telegram::run_repl;
use middleware::RateLimiter;
use std::sync::Arc;
use storage::ChatRepository;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

use super::components::{build_bot_components, build_handler_chain};
use super::config::BotConfig;

const LIMITER_PRUNE_INTERVAL: Duration = Duration::from_secs(300);

/// Main entry: init logging, validate config, build components and chain, then run REPL.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file())?;

    info!(
        database_url = %config.database_url(),
        model = %llm_client::LlmConfig::model(&config.llm),
        "Initializing bot"
    );

    let components = build_bot_components(&config, None, None).await?;
    let handler_chain = build_handler_chain(&config, &components);

    spawn_limiter_pruning(vec![
        components.chat_limiter.clone(),
        components.clear_history_limiter.clone(),
    ]);

    info!("Bot started successfully");

    run_repl(
        components.teloxide_bot.clone(),
        handler_chain,
        components.bot_username.clone(),
    )
    .await
}

/// Creates the database schema and exits. Needs neither a bot token nor an API key.
pub async fn init_db(database_url: &str, log_file: &str) -> Result<()> {
    init_tracing(log_file)?;
    ChatRepository::new(database_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize chat storage: {}", e))?;
    info!(database_url = %database_url, "Database initialized");
    Ok(())
}

/// Periodically drops expired limiter entries so the maps stay bounded by active users.
fn spawn_limiter_pruning(limiters: Vec<Arc<RateLimiter>>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            let now = Instant::now();
            for limiter in &limiters {
                limiter.prune(now);
            }
        }
    });
}
