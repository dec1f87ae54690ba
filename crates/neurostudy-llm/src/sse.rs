//! Line splitting and event parsing for provider streams.
//!
//! Providers send `data: <json>` lines terminated by a `data: [DONE]` line.
//! Network chunks do not respect line boundaries, so [`LineDecoder`] keeps
//! the trailing partial line and prepends it to the next chunk. Splitting
//! happens on raw bytes, which keeps multi-byte UTF-8 sequences intact when
//! a chunk boundary falls inside one. A line longer than
//! [`MAX_LINE_BYTES`] is dropped rather than buffered without bound.

use neurostudy_core::stream::DONE_SENTINEL;
use serde::Deserialize;

/// Longest line the decoder will buffer. Longer lines are dropped whole.
pub const MAX_LINE_BYTES: usize = 1 << 20;

#[derive(Debug)]
pub struct LineDecoder {
    buf: Vec<u8>,
    max_line: usize,
    /// Inside an oversized line; skip bytes until the next newline.
    skipping: bool,
    discarded: usize,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_line,
            skipping: false,
            discarded: 0,
        }
    }

    /// Number of lines dropped for exceeding the length limit.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Feed a chunk and return every line it completed, without terminators.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            if self.skipping {
                self.skipping = false;
            } else if self.buf.len() + pos > self.max_line {
                self.discarded += 1;
            } else {
                self.buf.extend_from_slice(&rest[..pos]);
                lines.push(decode_line(&self.buf));
            }
            self.buf.clear();
            rest = &rest[pos + 1..];
        }

        if !self.skipping && !rest.is_empty() {
            if self.buf.len() + rest.len() > self.max_line {
                self.buf.clear();
                self.skipping = true;
                self.discarded += 1;
            } else {
                self.buf.extend_from_slice(rest);
            }
        }
        lines
    }

    /// Flush the unterminated remainder at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        self.skipping = false;
        if self.buf.is_empty() {
            return None;
        }
        let line = decode_line(&self.buf);
        self.buf.clear();
        Some(line)
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Classification of one provider line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    Content(String),
    Done,
    /// Comments, keep-alives, non-`data` fields, and events with no text.
    Ignored,
    /// A `data` line whose payload is not a recognized envelope.
    Malformed,
}

/// Accepted payload shapes. Unknown fields are ignored.
#[derive(Deserialize)]
#[serde(untagged)]
enum EventEnvelope {
    /// `{"content": "..."}`, as emitted by relay-style upstreams.
    Flat { content: String },
    /// OpenAI chat-completion chunk.
    Chunk { choices: Vec<ChunkChoice> },
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Deserialize, Default)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

impl EventEnvelope {
    fn into_content(self) -> Option<String> {
        match self {
            EventEnvelope::Flat { content } => Some(content),
            EventEnvelope::Chunk { choices } => {
                choices.into_iter().next().and_then(|c| c.delta.content)
            }
        }
    }
}

pub fn parse_event(line: &str) -> ProviderEvent {
    let Some(payload) = line.strip_prefix("data:") else {
        return ProviderEvent::Ignored;
    };
    let payload = payload.trim();

    if payload.is_empty() {
        return ProviderEvent::Ignored;
    }
    if payload == DONE_SENTINEL {
        return ProviderEvent::Done;
    }

    match serde_json::from_str::<EventEnvelope>(payload) {
        Ok(envelope) => match envelope.into_content() {
            Some(content) if !content.is_empty() => ProviderEvent::Content(content),
            _ => ProviderEvent::Ignored,
        },
        Err(_) => ProviderEvent::Malformed,
    }
}
