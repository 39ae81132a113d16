//! Keeps the user table in sync with the senders seen by the bot.

use async_trait::async_trait;
use dbot_core::{Handler, Message, Result};
use storage::{ChatRepository, UpsertOutcome};
use tracing::{error, info, instrument};

/// Upserts the sender (display name, username) in before(). Storage failures are logged
/// and never stop the chain.
#[derive(Clone)]
pub struct UserSyncHandler {
    repo: ChatRepository,
}

impl UserSyncHandler {
    pub fn new(repo: ChatRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Handler for UserSyncHandler {
    #[instrument(skip(self, message), fields(user_id = message.user.id))]
    async fn before(&self, message: &Message) -> Result<bool> {
        let user = &message.user;
        if user.id == 0 {
            return Ok(true);
        }

        match self
            .repo
            .upsert_user(user.id, &user.display_name(), user.username.as_deref())
            .await
        {
            Ok(UpsertOutcome::Created) => info!(user_id = user.id, "New user started the bot"),
            Ok(UpsertOutcome::Updated) => {}
            Err(e) => error!(error = %e, user_id = user.id, "Failed to upsert user"),
        }

        Ok(true)
    }
}
