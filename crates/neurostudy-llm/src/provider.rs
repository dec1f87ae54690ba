//! The seam between the relay and an LLM backend.
//!
//! The relay never talks HTTP itself; it holds `Arc<dyn ChatProvider>`
//! handles that are constructed once at startup and shared by every
//! request.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Raw response body of a streaming call, chunked as it arrived.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, LlmError>> + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderRole {
    System,
    User,
    Assistant,
}

/// A message in a chat-completions request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMessage {
    pub role: ProviderRole,
    pub content: String,
}

impl ProviderMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ProviderRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ProviderRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ProviderRole::Assistant,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short label used in log fields.
    fn name(&self) -> &str;

    /// Open a streaming completion. Resolves once the provider has accepted
    /// the request; the body is read lazily from the returned stream.
    async fn stream_chat(&self, messages: &[ProviderMessage]) -> Result<ByteStream, LlmError>;

    /// Run a single non-streaming completion and return the assistant text.
    async fn complete_chat(&self, messages: &[ProviderMessage]) -> Result<String, LlmError>;
}
