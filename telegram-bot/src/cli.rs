//! Command line interface.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gemini-bot", version, about = "Telegram chatbot powered by Google Gemini")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bot (long polling). Configuration comes from the environment only.
    Run,
    /// Create the database schema and exit.
    InitDb,
}
