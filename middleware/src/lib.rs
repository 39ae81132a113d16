//! # Middleware crate for dbot framework
//!
//! Ambient handlers that run around the message handlers: logging, user tracking, and the
//! per-sender [`RateLimiter`] shared by the chat and command handlers.

mod logging;
mod rate_limiter;
mod user_sync;

#[cfg(test)]
mod test;

pub use logging::LoggingHandler;
pub use rate_limiter::RateLimiter;
pub use user_sync::UserSyncHandler;
