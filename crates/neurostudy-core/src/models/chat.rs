use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Role of a turn in the caller's conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single turn of conversation history, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Inbound body of `/api/chat` and `/api/chat-simple`.
///
/// The caller truncates `conversation_history` to a bounded window before
/// submitting; the relay forwards whatever it receives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub document_content: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, document_content: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            document_content: document_content.into(),
            conversation_history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.conversation_history = history;
        self
    }

    /// Reject requests whose message or document text is blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.message.trim().is_empty() {
            return Err(CoreError::EmptyField("message"));
        }
        if self.document_content.trim().is_empty() {
            return Err(CoreError::EmptyField("documentContent"));
        }
        Ok(())
    }
}
