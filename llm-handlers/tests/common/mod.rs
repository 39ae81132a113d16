//! Shared test doubles: a recording Bot and a scripted LlmClient. No network.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use dbot_core::{
    Bot, Chat, DbotError, MediaAttachment, MediaKind, Message,
    Result as DbotResult, TextFormat, User,
};
use llm_client::{Generation, LlmClient, LlmError, Result as LlmResult, UploadedFile};
use prompt::ChatTurn;
use storage::ChatRepository;

/// One outbound call seen by [`MockBot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCall {
    Send(String),
    Reply(String, TextFormat),
    Edit(String, String),
    Typing,
    Download(String),
}

/// Records every call. Markdown replies fail when `fail_markdown` is set; edits fail when
/// `fail_edit` is set.
#[derive(Default)]
pub struct MockBot {
    pub calls: Mutex<Vec<BotCall>>,
    pub fail_markdown: bool,
    pub fail_edit: bool,
    /// Last downloaded path, to check it was removed afterwards.
    pub downloaded: Mutex<Option<PathBuf>>,
}

impl MockBot {
    pub fn calls(&self) -> Vec<BotCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BotCall::Reply(text, _) => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, _chat: &Chat, text: &str) -> DbotResult<()> {
        self.calls.lock().unwrap().push(BotCall::Send(text.to_string()));
        Ok(())
    }

    async fn reply_to(&self, _message: &Message, text: &str, format: TextFormat) -> DbotResult<()> {
        if self.fail_markdown && format == TextFormat::Markdown {
            return Err(DbotError::Bot("can't parse entities".to_string()));
        }
        self.calls
            .lock()
            .unwrap()
            .push(BotCall::Reply(text.to_string(), format));
        Ok(())
    }

    async fn send_message_and_return_id(&self, _chat: &Chat, text: &str) -> DbotResult<String> {
        self.calls.lock().unwrap().push(BotCall::Send(text.to_string()));
        Ok("42".to_string())
    }

    async fn edit_message(&self, _chat: &Chat, message_id: &str, text: &str) -> DbotResult<()> {
        if self.fail_edit {
            return Err(DbotError::Bot("message to edit not found".to_string()));
        }
        self.calls
            .lock()
            .unwrap()
            .push(BotCall::Edit(message_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_typing(&self, _chat: &Chat) -> DbotResult<()> {
        self.calls.lock().unwrap().push(BotCall::Typing);
        Ok(())
    }

    async fn download_file(&self, file_id: &str, dir: &Path) -> DbotResult<PathBuf> {
        self.calls
            .lock()
            .unwrap()
            .push(BotCall::Download(file_id.to_string()));
        let path = dir.join(format!("{}.jpg", file_id));
        tokio::fs::write(&path, b"fake image").await?;
        *self.downloaded.lock().unwrap() = Some(path.clone());
        Ok(path)
    }
}

/// Scripted model behaviour.
#[derive(Debug, Clone)]
pub enum LlmBehavior {
    Reply(String),
    Stop(String),
    Fail(String),
}

/// Records generate/upload calls and answers per [`LlmBehavior`].
pub struct MockLlm {
    pub behavior: Mutex<LlmBehavior>,
    pub generate_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub fail_upload: bool,
    pub last_request: Mutex<Option<(String, Vec<ChatTurn>, ChatTurn)>>,
}

impl MockLlm {
    pub fn new(behavior: LlmBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            generate_calls: AtomicUsize::new(0),
            upload_calls: AtomicUsize::new(0),
            fail_upload: false,
            last_request: Mutex::new(None),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(LlmBehavior::Reply(text.to_string()))
    }

    pub fn generate_count(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn upload_count(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(String, Vec<ChatTurn>, ChatTurn)> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn generate(
        &self,
        system_prompt: &str,
        history: Vec<ChatTurn>,
        message: ChatTurn,
    ) -> LlmResult<Generation> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() =
            Some((system_prompt.to_string(), history, message));
        match self.behavior.lock().unwrap().clone() {
            LlmBehavior::Reply(text) => Ok(Generation::text(text)),
            LlmBehavior::Stop(reason) => Err(LlmError::GenerationStopped(reason)),
            LlmBehavior::Fail(reason) => Err(LlmError::Request(reason)),
        }
    }

    async fn upload_file(&self, path: &Path, mime_type: &str) -> LlmResult<UploadedFile> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_upload {
            return Err(LlmError::Upload("quota exceeded".to_string()));
        }
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();
        Ok(UploadedFile {
            name: format!("files/{}", name),
            uri: format!("https://files.example/{}", name),
            mime_type: mime_type.to_string(),
        })
    }
}

pub async fn memory_repo() -> ChatRepository {
    ChatRepository::new("sqlite::memory:")
        .await
        .expect("in-memory repo")
}

pub fn make_message(content: &str, chat_type: &str) -> Message {
    Message {
        id: "msg_1".to_string(),
        user: User {
            id: 123,
            username: Some("alice".to_string()),
            first_name: Some("Alice".to_string()),
            last_name: Some("Smith".to_string()),
        },
        chat: Chat {
            id: if chat_type == "private" { 123 } else { -100 },
            chat_type: chat_type.to_string(),
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

/// A bot account as the replied-to sender.
pub fn bot_user(username: &str) -> User {
    User {
        id: 777,
        username: Some(username.to_string()),
        first_name: Some("Bot".to_string()),
        last_name: None,
    }
}

pub fn photo(file_size: u64) -> MediaAttachment {
    MediaAttachment {
        kind: MediaKind::Photo,
        file_id: "photo_1".to_string(),
        file_size,
        file_name: None,
        mime_type: None,
    }
}

pub fn username(name: Option<&str>) -> Arc<tokio::sync::RwLock<Option<String>>> {
    Arc::new(tokio::sync::RwLock::new(name.map(String::from)))
}
