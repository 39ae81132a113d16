//! Binary for the Gemini Telegram bot.

use anyhow::Result;
use clap::Parser;
use dbot_telegram::DEFAULT_LOG_FILE;
use telegram_bot::{init_db, run_bot, BaseConfig, BotConfig, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_bot(BotConfig::load()?).await,
        Commands::InitDb => {
            let log_file = std::env::var("LOG_FILE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());
            init_db(&BaseConfig::database_url_from_env(), &log_file).await
        }
    }
}
