//! Streaming chat relay with a two-tier degrade.
//!
//! A turn is streamed from the primary provider and re-emitted as
//! normalized [`StreamEvent`]s. If the stream fails before producing any
//! content, the relay makes one non-streaming call to the fallback provider
//! and emits its answer as a single fragment. If that also fails, the
//! caller gets [`FAILURE_NOTICE`] instead of an error.
//!
//! ```text
//! STREAMING ─┬─ SUCCESS ──────────────────────────────┐
//!            └─ STREAM_FAILED ─┬─ (partial output) ───┤
//!                              └─ FALLBACK_ATTEMPT ─┬─ SUCCESS ─────────┤
//!                                                   └─ DONE_WITH_ERROR ─┴─ [DONE]
//! ```
//!
//! Whatever happens, the last item of every relay stream is exactly one
//! [`StreamEvent::Done`]. Fragments already emitted are never withdrawn.
//!
//! A failure after partial output ends the turn: there is no retry and no
//! resume. The caller keeps the truncated answer.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use neurostudy_core::models::chat::ChatRequest;
use neurostudy_core::stream::{FAILURE_NOTICE, StreamEvent};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::context::build_messages;
use crate::error::LlmError;
use crate::provider::{ChatProvider, ProviderMessage};
use crate::sse::{LineDecoder, ProviderEvent, parse_event};

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_FALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

#[derive(Clone)]
pub struct ChatRelay {
    primary: Arc<dyn ChatProvider>,
    fallback: Arc<dyn ChatProvider>,
    idle_timeout: Duration,
    fallback_timeout: Duration,
}

impl ChatRelay {
    pub fn new(primary: Arc<dyn ChatProvider>, fallback: Arc<dyn ChatProvider>) -> Self {
        Self {
            primary,
            fallback,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            fallback_timeout: DEFAULT_FALLBACK_TIMEOUT,
        }
    }

    /// Maximum wait for the primary to accept the request, and then for
    /// each chunk of its stream.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Upper bound on a single fallback completion.
    pub fn with_fallback_timeout(mut self, fallback_timeout: Duration) -> Self {
        self.fallback_timeout = fallback_timeout;
        self
    }

    /// Relay a chat turn as a stream of fragments ending in `Done`.
    ///
    /// The stream is lazy: nothing is sent to the provider until it is
    /// first polled. Dropping it stops reading from the provider and
    /// releases the connection.
    pub fn stream_chat(&self, request: ChatRequest) -> EventStream {
        let primary = Arc::clone(&self.primary);
        let fallback = Arc::clone(&self.fallback);
        let idle_timeout = self.idle_timeout;
        let fallback_timeout = self.fallback_timeout;

        Box::pin(async_stream::stream! {
            let request_id = Uuid::new_v4();
            let messages = build_messages(&request);

            info!(
                request_id = %request_id,
                provider = primary.name(),
                history_len = request.conversation_history.len(),
                document_len = request.document_content.len(),
                "relaying chat turn"
            );

            let mut emitted = 0usize;
            let mut terminated = false;
            let mut failure: Option<LlmError> = None;

            let opening = tokio::time::timeout(idle_timeout, primary.stream_chat(&messages));
            let opened = match opening.await {
                Ok(opened) => opened,
                Err(_) => Err(LlmError::Timeout(format!(
                    "no response from provider within {}ms",
                    idle_timeout.as_millis()
                ))),
            };

            match opened {
                Err(e) => failure = Some(e),
                Ok(mut body) => {
                    let mut decoder = LineDecoder::new();

                    'read: loop {
                        let next = match tokio::time::timeout(idle_timeout, body.next()).await {
                            Ok(next) => next,
                            Err(_) => {
                                failure = Some(LlmError::Timeout(format!(
                                    "no data from provider for {}ms",
                                    idle_timeout.as_millis()
                                )));
                                break;
                            }
                        };

                        let (lines, eof) = match next {
                            Some(Ok(chunk)) => (decoder.push(&chunk), false),
                            Some(Err(e)) => {
                                failure = Some(e);
                                break;
                            }
                            None => (decoder.finish().into_iter().collect(), true),
                        };

                        for line in lines {
                            match parse_event(&line) {
                                ProviderEvent::Content(content) => {
                                    emitted += 1;
                                    yield StreamEvent::fragment(content);
                                }
                                ProviderEvent::Done => {
                                    terminated = true;
                                    break 'read;
                                }
                                ProviderEvent::Malformed => {
                                    debug!(request_id = %request_id, line = %line, "skipping malformed stream line");
                                }
                                ProviderEvent::Ignored => {}
                            }
                        }

                        if eof {
                            break;
                        }
                    }

                    if decoder.discarded() > 0 {
                        warn!(
                            request_id = %request_id,
                            discarded = decoder.discarded(),
                            "dropped oversized stream lines"
                        );
                    }

                    if failure.is_none() && !terminated && emitted == 0 {
                        failure = Some(LlmError::IncompleteStream);
                    }
                }
            }

            match failure {
                None => {
                    info!(
                        request_id = %request_id,
                        fragments = emitted,
                        terminated,
                        "chat stream complete"
                    );
                }
                Some(e) if emitted > 0 => {
                    warn!(
                        request_id = %request_id,
                        fragments = emitted,
                        error = %e,
                        "chat stream interrupted, ending turn with partial answer"
                    );
                }
                Some(e) => {
                    warn!(
                        request_id = %request_id,
                        error = %e,
                        fallback = fallback.name(),
                        "chat stream failed before output, trying fallback"
                    );
                    let content = complete_or_notice(
                        fallback.as_ref(),
                        &messages,
                        fallback_timeout,
                        request_id,
                    )
                    .await;
                    yield StreamEvent::fragment(content);
                }
            }

            yield StreamEvent::Done;
        })
    }

    /// Non-streaming chat turn against the fallback provider.
    ///
    /// Never fails: provider errors degrade to [`FAILURE_NOTICE`].
    pub async fn complete(&self, request: &ChatRequest) -> String {
        let request_id = Uuid::new_v4();
        let messages = build_messages(request);

        info!(
            request_id = %request_id,
            provider = self.fallback.name(),
            history_len = request.conversation_history.len(),
            "running single-shot chat turn"
        );

        complete_or_notice(
            self.fallback.as_ref(),
            &messages,
            self.fallback_timeout,
            request_id,
        )
        .await
    }
}

async fn complete_or_notice(
    provider: &dyn ChatProvider,
    messages: &[ProviderMessage],
    timeout: Duration,
    request_id: Uuid,
) -> String {
    let result = tokio::time::timeout(timeout, provider.complete_chat(messages))
        .await
        .unwrap_or_else(|_| {
            Err(LlmError::Timeout(format!(
                "no completion within {}ms",
                timeout.as_millis()
            )))
        });

    match result {
        Ok(content) => {
            info!(request_id = %request_id, content_len = content.len(), "fallback completion succeeded");
            content
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "fallback completion failed");
            FAILURE_NOTICE.to_string()
        }
    }
}
