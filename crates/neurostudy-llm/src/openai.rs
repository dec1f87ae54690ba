//! OpenAI-compatible chat-completions provider (OpenAI, Groq, and anything
//! else that speaks the same `/chat/completions` contract).

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::LlmError;
use crate::provider::{ByteStream, ChatProvider, ProviderMessage};

/// Endpoint, credentials, and model for one provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
}

/// Build the shared HTTP client. Only the connect phase is bounded here;
/// streaming reads are bounded per chunk by the relay.
pub fn build_http_client(connect_timeout: Duration) -> Result<Client, LlmError> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .build()
        .map_err(|e| LlmError::Transport(format!("failed to build HTTP client: {e}")))
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ProviderMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

pub struct OpenAiCompatProvider {
    name: String,
    client: Client,
    settings: ProviderSettings,
    request_timeout: Duration,
}

impl OpenAiCompatProvider {
    pub fn new(
        name: impl Into<String>,
        client: Client,
        settings: ProviderSettings,
        request_timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            client,
            settings,
            request_timeout,
        }
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        completions_url(&self.settings.base_url)
    }

    fn request(&self, messages: &[ProviderMessage], stream: bool) -> reqwest::RequestBuilder {
        let body = CompletionRequest {
            model: &self.settings.model,
            messages,
            stream,
            temperature: self.settings.temperature,
        };

        let mut builder = self.client.post(self.endpoint()).json(&body);
        if !self.settings.api_key.is_empty() {
            builder = builder.bearer_auth(&self.settings.api_key);
        }
        builder
    }
}

/// Append `/chat/completions` unless the base URL already ends with it.
pub fn completions_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/chat/completions")
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            debug!(status = status.as_u16(), error = %e, "failed to read error response body");
            format!("<unreadable body: {e}>")
        }
    };
    Err(LlmError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ChatProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream_chat(&self, messages: &[ProviderMessage]) -> Result<ByteStream, LlmError> {
        debug!(provider = %self.name, model = %self.settings.model, "opening completion stream");

        let response = self
            .request(messages, true)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let response = ensure_success(response).await?;

        Ok(Box::pin(response.bytes_stream().map_err(LlmError::from)))
    }

    async fn complete_chat(&self, messages: &[ProviderMessage]) -> Result<String, LlmError> {
        let response = self
            .request(messages, false)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body = response.text().await?;
        let content = parse_completion(&body)?;

        info!(
            provider = %self.name,
            model = %self.settings.model,
            content_len = content.len(),
            "completion received"
        );

        Ok(content)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CompletionBody {
    Choices { choices: Vec<CompletionChoice> },
    Flat { content: String },
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Extract the assistant text from a non-streaming response body.
///
/// Accepts an OpenAI completion object or a flat `{"content": "..."}`.
pub fn parse_completion(body: &str) -> Result<String, LlmError> {
    let parsed: CompletionBody = serde_json::from_str(body)
        .map_err(|e| LlmError::ResponseParse(format!("unrecognized completion body: {e}")))?;

    match parsed {
        CompletionBody::Flat { content } => Ok(content),
        CompletionBody::Choices { choices } => choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::ResponseParse("no message content in response".to_string())),
    }
}
