//! Thread and message domain models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MarginaliaError;

/// Represents the role of a message in a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Message generated by the persona.
    Assistant,
}

/// A single message in a thread.
///
/// Messages are immutable once created. The timestamp doubles as the stable
/// identity used by sentence addresses when message positions shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Timestamp when the message was created (RFC 3339).
    pub timestamp: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Creates a user message stamped with the current time.
    pub fn user_now(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content, chrono::Utc::now().to_rfc3339())
    }

    /// Creates an assistant message stamped with the current time.
    pub fn assistant_now(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content, chrono::Utc::now().to_rfc3339())
    }
}

/// The purpose a thread serves for its persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadType {
    Interpretation,
    Proceed,
    Sentence,
    Verbalization,
}

impl ThreadType {
    pub const ALL: [ThreadType; 4] = [
        ThreadType::Interpretation,
        ThreadType::Proceed,
        ThreadType::Sentence,
        ThreadType::Verbalization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadType::Interpretation => "interpretation",
            ThreadType::Proceed => "proceed",
            ThreadType::Sentence => "sentence",
            ThreadType::Verbalization => "verbalization",
        }
    }

    /// Verbalization threads live in their own list rather than under a persona.
    pub fn is_persona_scoped(&self) -> bool {
        !matches!(self, ThreadType::Verbalization)
    }
}

impl fmt::Display for ThreadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThreadType {
    type Err = MarginaliaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThreadType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| MarginaliaError::validation(format!("Unknown thread type: {s}")))
    }
}

/// An ordered message list tied to one (persona, purpose) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub persona_id: String,
    pub thread_type: ThreadType,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Source text the thread was opened on.
    #[serde(default)]
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Thread {
    /// Creates an empty thread stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        persona_id: impl Into<String>,
        thread_type: ThreadType,
        content: impl Into<String>,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: id.into(),
            persona_id: persona_id.into(),
            thread_type,
            messages: Vec::new(),
            content: content.into(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Appends a message and bumps `updated_at`.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
