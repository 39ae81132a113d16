//! # Prompt
//!
//! Vendor-neutral chat turn types used to build a model request:
//!
//! - [`ChatTurn`] / [`ChatPart`]: one turn (user or model) made of text and file parts.
//! - [`seed_examples`]: the fixed example exchange every conversation starts with.
//! - [`render_system_prompt`]: personalises a system prompt template with the sender's name.
//!
//! Converted into Gemini `Content` by the `llm-client` crate.

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

/// One fragment of a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatPart {
    Text(String),
    /// Vendor-hosted file reference.
    File { mime_type: String, uri: String },
}

impl ChatPart {
    pub fn text(text: impl Into<String>) -> Self {
        ChatPart::Text(text.into())
    }

    pub fn file(mime_type: impl Into<String>, uri: impl Into<String>) -> Self {
        ChatPart::File {
            mime_type: mime_type.into(),
            uri: uri.into(),
        }
    }
}

/// A single conversational turn with ordered parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub parts: Vec<ChatPart>,
}

impl ChatTurn {
    pub fn new(role: TurnRole, parts: Vec<ChatPart>) -> Self {
        Self { role, parts }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(TurnRole::User, vec![ChatPart::text(text)])
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(TurnRole::Model, vec![ChatPart::text(text)])
    }

    /// Builds the user turn for a new message: file part first, then text.
    /// Blank text is left out.
    pub fn user_message(text: Option<&str>, file: Option<(&str, &str)>) -> Self {
        let mut parts = Vec::with_capacity(2);
        if let Some((mime_type, uri)) = file {
            parts.push(ChatPart::file(mime_type, uri));
        }
        if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
            parts.push(ChatPart::text(text));
        }
        Self::new(TurnRole::User, parts)
    }

    /// Concatenated text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ChatPart::Text(t) => Some(t.as_str()),
                ChatPart::File { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Placeholder in a system prompt template replaced by the sender's display name.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Used when no system prompt template is configured or readable.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Ai, a friendly member of a Telegram community. \
You are chatting with {name}. Keep your replies short, casual and conversational, \
like a person typing in a chat. Never mention that you are a language model.";

const SEED_EXCHANGE: &[(&str, &str)] = &[
    ("Hi there", "Oh hi! Are you new here?"),
    (
        "Yeah",
        "Oh alright cool, hope you'll have a great time chatting with others!",
    ),
    (
        "Yeah, Mind if I promote my channel here?",
        "Oh no, I'm afraid you can't as it's against out community rules.",
    ),
    ("Oh, Alright. Where do you live?", "I live in Tokyo."),
    ("Who are you?", "I'm Ai"),
];

/// The fixed example exchange (10 alternating turns, user first) prepended to every history.
pub fn seed_examples() -> Vec<ChatTurn> {
    SEED_EXCHANGE
        .iter()
        .flat_map(|(user, model)| [ChatTurn::user(*user), ChatTurn::model(*model)])
        .collect()
}

/// Replaces every `{name}` in `template` with `name`.
pub fn render_system_prompt(template: &str, name: &str) -> String {
    template.replace(NAME_PLACEHOLDER, name)
}
