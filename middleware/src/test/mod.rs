//! Unit test module
//!
//! Middleware unit tests live here, separate from source files.
//! Tests interact with middleware via public and pub(crate) APIs.


use chrono::Utc;
use dbot_core::{Chat, Message, User};

/// Builds a test Message with fixed user_id=123, chat_id=456.
pub(crate) fn create_test_message(content: &str) -> Message {
    Message {
        id: "test_message_id".to_string(),
        user: User {
            id: 123,
            username: Some("test_user".to_string()),
            first_name: Some("Test".to_string()),
            last_name: Some("User".to_string()),
        },
        chat: Chat {
            id: 456,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        caption: None,
        media: None,
        message_type: "text".to_string(),
        created_at: Utc::now(),
        reply_to_message_id: None,
        reply_to_user: None,
    }
}
