#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use neurostudy_core::stream::StreamEvent;
use neurostudy_llm::error::LlmError;
use neurostudy_llm::provider::{ByteStream, ChatProvider, ProviderMessage};
use neurostudy_llm::relay::EventStream;

#[derive(Clone)]
pub enum Chunk {
    Data(Bytes),
    Fail,
}

#[derive(Clone)]
pub enum StreamScript {
    /// `stream_chat` itself fails, as on a refused connection or 5xx.
    Refuse,
    /// `stream_chat` never resolves, as when response headers never arrive.
    Stall,
    /// Yield the chunks, then either end or hang forever.
    Body { chunks: Vec<Chunk>, hang: bool },
}

/// Provider that replays a fixed script and records what it was asked.
pub struct FakeProvider {
    script: StreamScript,
    completion: Result<String, String>,
    stall_completion: bool,
    pub stream_calls: AtomicUsize,
    pub complete_calls: AtomicUsize,
    pub seen: Mutex<Vec<Vec<ProviderMessage>>>,
    pub body_dropped: Arc<AtomicBool>,
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl FakeProvider {
    fn with_script(script: StreamScript) -> Self {
        Self {
            script,
            completion: Err("completion not scripted".to_string()),
            stall_completion: false,
            stream_calls: AtomicUsize::new(0),
            complete_calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            body_dropped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn refusing() -> Self {
        Self::with_script(StreamScript::Refuse)
    }

    pub fn stalling() -> Self {
        Self::with_script(StreamScript::Stall)
    }

    pub fn streaming(lines: &[&str]) -> Self {
        Self::streaming_chunks(lines.iter().map(|l| Chunk::Data(Bytes::from(l.to_string()))).collect())
    }

    pub fn streaming_chunks(chunks: Vec<Chunk>) -> Self {
        Self::with_script(StreamScript::Body {
            chunks,
            hang: false,
        })
    }

    pub fn hanging_after(lines: &[&str]) -> Self {
        Self::with_script(StreamScript::Body {
            chunks: lines
                .iter()
                .map(|l| Chunk::Data(Bytes::from(l.to_string())))
                .collect(),
            hang: true,
        })
    }

    pub fn completing(content: &str) -> Self {
        Self::refusing().with_completion(Ok(content.to_string()))
    }

    pub fn with_completion(mut self, completion: Result<String, String>) -> Self {
        self.completion = completion;
        self
    }

    /// `complete_chat` never resolves.
    pub fn with_stalled_completion(mut self) -> Self {
        self.stall_completion = true;
        self
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    pub fn body_dropped(&self) -> bool {
        self.body_dropped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    async fn stream_chat(&self, messages: &[ProviderMessage]) -> Result<ByteStream, LlmError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages.to_vec());

        let (chunks, hang) = match &self.script {
            StreamScript::Refuse => {
                return Err(LlmError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            StreamScript::Stall => futures::future::pending().await,
            StreamScript::Body { chunks, hang } => (chunks.clone(), *hang),
        };

        let guard = DropFlag(Arc::clone(&self.body_dropped));
        Ok(Box::pin(async_stream::stream! {
            let _guard = guard;
            for chunk in chunks {
                match chunk {
                    Chunk::Data(bytes) => yield Ok(bytes),
                    Chunk::Fail => {
                        yield Err(LlmError::Transport("connection reset".to_string()));
                        return;
                    }
                }
            }
            if hang {
                futures::future::pending::<()>().await;
            }
        }))
    }

    async fn complete_chat(&self, messages: &[ProviderMessage]) -> Result<String, LlmError> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages.to_vec());
        if self.stall_completion {
            futures::future::pending::<()>().await;
        }
        self.completion.clone().map_err(LlmError::Transport)
    }
}

pub async fn collect(stream: EventStream) -> Vec<StreamEvent> {
    stream.collect().await
}

pub fn done_count(events: &[StreamEvent]) -> usize {
    events.iter().filter(|e| e.is_done()).count()
}
