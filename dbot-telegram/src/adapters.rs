//! Adapters from Telegram (teloxide) types to dbot_core types.
//! Depends only on teloxide and dbot_core type definitions.

use dbot_core::{
    Chat, MediaAttachment, MediaKind, Message, ToCoreMessage, ToCoreUser, User,
};
use teloxide::types::FileMeta;

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Wraps a teloxide Message for conversion to core [`Message`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        let media = self.get_media();
        let message_type = match (&media, self.0.text()) {
            (Some(m), _) => m.kind.as_str(),
            (None, Some(_)) => "text",
            (None, None) => "other",
        };
        Message {
            id: self.0.id.0.to_string(),
            user: self.get_sender(),
            chat: Chat {
                id: self.0.chat.id.0,
                chat_type: self.get_chat_type().to_string(),
            },
            content: self.0.text().unwrap_or("").to_string(),
            caption: self.0.caption().map(str::to_string),
            media,
            message_type: message_type.to_string(),
            created_at: self.0.date,
            reply_to_message_id: self.get_reply_to_message_id(),
            reply_to_user: self.get_reply_to_user(),
        }
    }
}

impl<'a> TelegramMessageWrapper<'a> {
    /// The sending user, or the sending chat for anonymous/channel posts.
    fn get_sender(&self) -> User {
        if let Some(user) = self.0.from.as_ref() {
            return TelegramUserWrapper(user).to_core();
        }
        match self.0.sender_chat.as_ref() {
            Some(chat) => User {
                id: chat.id.0,
                username: chat.username().map(str::to_string),
                first_name: chat.title().map(str::to_string),
                last_name: None,
            },
            None => User {
                id: 0,
                username: None,
                first_name: None,
                last_name: None,
            },
        }
    }

    fn get_chat_type(&self) -> &'static str {
        let chat = &self.0.chat;
        if chat.is_private() {
            "private"
        } else if chat.is_supergroup() {
            "supergroup"
        } else if chat.is_group() {
            "group"
        } else if chat.is_channel() {
            "channel"
        } else {
            "unknown"
        }
    }

    /// Media metadata of the message, if any. Photos use the largest size.
    fn get_media(&self) -> Option<MediaAttachment> {
        let msg = self.0;
        if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
            return Some(attachment(MediaKind::Photo, &photo.file, None, None));
        }
        if let Some(animation) = msg.animation() {
            return Some(attachment(
                MediaKind::Animation,
                &animation.file,
                animation.file_name.clone(),
                animation.mime_type.as_ref().map(|m| m.essence_str().to_string()),
            ));
        }
        if let Some(document) = msg.document() {
            return Some(attachment(
                MediaKind::Document,
                &document.file,
                document.file_name.clone(),
                document.mime_type.as_ref().map(|m| m.essence_str().to_string()),
            ));
        }
        if let Some(video) = msg.video() {
            return Some(attachment(
                MediaKind::Video,
                &video.file,
                video.file_name.clone(),
                video.mime_type.as_ref().map(|m| m.essence_str().to_string()),
            ));
        }
        if let Some(audio) = msg.audio() {
            return Some(attachment(
                MediaKind::Audio,
                &audio.file,
                audio.file_name.clone(),
                audio.mime_type.as_ref().map(|m| m.essence_str().to_string()),
            ));
        }
        if let Some(voice) = msg.voice() {
            return Some(attachment(
                MediaKind::Voice,
                &voice.file,
                None,
                voice.mime_type.as_ref().map(|m| m.essence_str().to_string()),
            ));
        }
        if let Some(note) = msg.video_note() {
            return Some(attachment(
                MediaKind::VideoNote,
                &note.file,
                None,
                Some("video/mp4".to_string()),
            ));
        }
        if let Some(sticker) = msg.sticker() {
            return Some(attachment(MediaKind::Sticker, &sticker.file, None, None));
        }
        None
    }

    /// Returns the id of the replied-to message if present.
    fn get_reply_to_message_id(&self) -> Option<String> {
        self.0.reply_to_message().map(|msg| msg.id.0.to_string())
    }

    fn get_reply_to_user(&self) -> Option<User> {
        self.0
            .reply_to_message()
            .and_then(|m| m.from.as_ref())
            .map(|u| TelegramUserWrapper(u).to_core())
    }
}

fn attachment(
    kind: MediaKind,
    file: &FileMeta,
    file_name: Option<String>,
    mime_type: Option<String>,
) -> MediaAttachment {
    MediaAttachment {
        kind,
        file_id: file.id.0.clone(),
        file_size: u64::from(file.size),
        file_name,
        mime_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> teloxide::types::Message {
        serde_json::from_value(value).expect("valid Bot API message")
    }

    /// **Test: TelegramUserWrapper converts teloxide User to core User with correct id, username, first_name, last_name.**
    #[test]
    fn test_telegram_user_wrapper_to_core() {
        let user = teloxide::types::User {
            id: teloxide::types::UserId(123),
            is_bot: false,
            first_name: "Test".to_string(),
            last_name: Some("User".to_string()),
            username: Some("testuser".to_string()),
            language_code: Some("en".to_string()),
            is_premium: false,
            added_to_attachment_menu: false,
        };

        let wrapper = TelegramUserWrapper(&user);
        let core_user = wrapper.to_core();

        assert_eq!(core_user.id, 123);
        assert_eq!(core_user.username, Some("testuser".to_string()));
        assert_eq!(core_user.first_name, Some("Test".to_string()));
        assert_eq!(core_user.last_name, Some("User".to_string()));
    }

    /// **Test: A private text message maps to chat_type "private" and message_type "text".**
    #[test]
    fn test_text_message_to_core() {
        let msg = parse(json!({
            "message_id": 7,
            "date": 1_700_000_000,
            "chat": {"id": 42, "type": "private", "first_name": "Alice"},
            "from": {"id": 42, "is_bot": false, "first_name": "Alice", "username": "alice"},
            "text": "hello"
        }));

        let core = TelegramMessageWrapper(&msg).to_core();
        assert_eq!(core.id, "7");
        assert_eq!(core.user.id, 42);
        assert_eq!(core.chat.chat_type, "private");
        assert_eq!(core.content, "hello");
        assert_eq!(core.message_type, "text");
        assert!(core.media.is_none());
    }

    /// **Test: A photo uses the largest size; caption and file size are carried over.**
    #[test]
    fn test_photo_message_to_core() {
        let msg = parse(json!({
            "message_id": 8,
            "date": 1_700_000_000,
            "chat": {"id": -100123, "type": "supergroup", "title": "Chat"},
            "from": {"id": 42, "is_bot": false, "first_name": "Alice"},
            "photo": [
                {"file_id": "small", "file_unique_id": "s", "width": 90, "height": 90, "file_size": 1000},
                {"file_id": "big", "file_unique_id": "b", "width": 800, "height": 800, "file_size": 50000}
            ],
            "caption": "@gemini_bot look"
        }));

        let core = TelegramMessageWrapper(&msg).to_core();
        let media = core.media.expect("photo media");
        assert_eq!(media.kind, MediaKind::Photo);
        assert_eq!(media.file_id, "big");
        assert_eq!(media.file_size, 50000);
        assert_eq!(core.caption.as_deref(), Some("@gemini_bot look"));
        assert_eq!(core.chat.chat_type, "supergroup");
        assert_eq!(core.message_type, "photo");
        assert_eq!(core.content, "");
    }

    /// **Test: A document keeps its declared MIME type and file name.**
    #[test]
    fn test_document_message_to_core() {
        let msg = parse(json!({
            "message_id": 9,
            "date": 1_700_000_000,
            "chat": {"id": 42, "type": "private", "first_name": "Alice"},
            "from": {"id": 42, "is_bot": false, "first_name": "Alice"},
            "document": {
                "file_id": "doc", "file_unique_id": "d", "file_size": 2048,
                "file_name": "report.pdf", "mime_type": "application/pdf"
            }
        }));

        let media = TelegramMessageWrapper(&msg).to_core().media.expect("document");
        assert_eq!(media.kind, MediaKind::Document);
        assert_eq!(media.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(media.file_name.as_deref(), Some("report.pdf"));
    }

    /// **Test: A reply carries the replied-to sender, so only replies to this bot address it.**
    #[test]
    fn test_reply_keeps_replied_to_sender() {
        let msg = parse(json!({
            "message_id": 11,
            "date": 1_700_000_000,
            "chat": {"id": -100123, "type": "supergroup", "title": "Chat"},
            "from": {"id": 42, "is_bot": false, "first_name": "Alice"},
            "text": "thanks",
            "reply_to_message": {
                "message_id": 10,
                "date": 1_699_999_999,
                "chat": {"id": -100123, "type": "supergroup", "title": "Chat"},
                "from": {"id": 777, "is_bot": true, "first_name": "Other", "username": "some_other_bot"},
                "text": "beep"
            }
        }));

        let core = TelegramMessageWrapper(&msg).to_core();
        assert_eq!(core.reply_to_message_id.as_deref(), Some("10"));
        let replied_to = core.reply_to_user.as_ref().expect("replied-to sender");
        assert_eq!(replied_to.id, 777);
        assert!(core.is_reply_to("some_other_bot"));
        assert!(!core.is_reply_to("gemini_bot"));
    }
}
