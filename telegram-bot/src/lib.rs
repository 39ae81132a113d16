//! # Telegram bot application
//!
//! Wires storage, the Gemini client, the handlers and the Telegram runner. Loads config from env
//! and runs the REPL.

pub mod cli;
pub mod components;
pub mod config;
pub mod runner;

pub use cli::{Cli, Commands};
pub use components::{build_bot_components, build_handler_chain, open_repository, BotComponents};
pub use config::{BaseConfig, BotConfig, ChatConfig};
pub use runner::{init_db, run_bot};
