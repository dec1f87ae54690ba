#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;
use neurostudy_llm::error::LlmError;
use neurostudy_llm::provider::{ByteStream, ChatProvider, ProviderMessage};
use neurostudy_llm::relay::ChatRelay;
use neurostudy_server::app;
use neurostudy_server::state::AppState;

/// Provider with a canned stream (or a refusal) and a canned completion.
pub struct ScriptedProvider {
    pub stream: Option<Vec<&'static str>>,
    pub completion: Result<String, String>,
}

impl ScriptedProvider {
    pub fn streaming(lines: Vec<&'static str>) -> Self {
        Self {
            stream: Some(lines),
            completion: Err("no completion".to_string()),
        }
    }

    pub fn refusing(completion: Result<&str, &str>) -> Self {
        Self {
            stream: None,
            completion: completion.map(str::to_string).map_err(str::to_string),
        }
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn stream_chat(&self, _messages: &[ProviderMessage]) -> Result<ByteStream, LlmError> {
        match &self.stream {
            Some(lines) => {
                let chunks: Vec<Result<Bytes, LlmError>> =
                    lines.iter().map(|l| Ok(Bytes::from_static(l.as_bytes()))).collect();
                Ok(Box::pin(futures::stream::iter(chunks)))
            }
            None => Err(LlmError::Transport("connection refused".to_string())),
        }
    }

    async fn complete_chat(&self, _messages: &[ProviderMessage]) -> Result<String, LlmError> {
        self.completion
            .clone()
            .map_err(|e| LlmError::Status { status: 503, body: e })
    }
}

pub fn router(primary: ScriptedProvider, fallback: ScriptedProvider) -> Router {
    let primary: Arc<dyn ChatProvider> = Arc::new(primary);
    let relay = ChatRelay::new(Arc::clone(&primary), Arc::new(fallback));
    app(AppState::new(relay, primary))
}
