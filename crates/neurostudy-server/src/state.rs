use std::sync::Arc;

use neurostudy_llm::error::LlmError;
use neurostudy_llm::openai::{OpenAiCompatProvider, build_http_client};
use neurostudy_llm::provider::ChatProvider;
use neurostudy_llm::relay::ChatRelay;

use crate::config::ServerConfig;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub relay: ChatRelay,
    /// Provider used by the single-shot study generators.
    pub generator: Arc<dyn ChatProvider>,
}

impl AppState {
    pub fn new(relay: ChatRelay, generator: Arc<dyn ChatProvider>) -> Self {
        Self { relay, generator }
    }

    /// Build providers from configuration. One HTTP client (and its
    /// connection pool) is shared by both providers.
    pub fn from_config(config: &ServerConfig) -> Result<Self, LlmError> {
        let client = build_http_client(config.connect_timeout)?;

        let primary: Arc<dyn ChatProvider> = Arc::new(OpenAiCompatProvider::new(
            "primary",
            client.clone(),
            config.primary.clone(),
            config.request_timeout,
        ));
        let fallback: Arc<dyn ChatProvider> = Arc::new(OpenAiCompatProvider::new(
            "fallback",
            client,
            config.fallback.clone(),
            config.request_timeout,
        ));

        let relay = ChatRelay::new(Arc::clone(&primary), fallback)
            .with_idle_timeout(config.idle_timeout)
            .with_fallback_timeout(config.request_timeout);

        Ok(Self::new(relay, primary))
    }
}
