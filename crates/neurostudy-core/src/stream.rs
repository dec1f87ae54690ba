//! Normalized stream events emitted by the relay and their line framing.
//!
//! Every event is written as one `data: <payload>\n` line. Fragments carry a
//! JSON object `{"content": "..."}`; the terminal marker is the literal
//! `[DONE]` payload. Callers rebuild the assistant answer by concatenating
//! fragment contents in arrival order.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

/// Shown to the user when both the stream and the fallback call fail.
pub const FAILURE_NOTICE: &str = "Uplink Failure: System Offline.";

/// One incremental piece of an assistant turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFragment {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Fragment(StreamFragment),
    Done,
}

impl StreamEvent {
    pub fn fragment(content: impl Into<String>) -> Self {
        StreamEvent::Fragment(StreamFragment {
            content: content.into(),
        })
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            StreamEvent::Fragment(f) => Some(&f.content),
            StreamEvent::Done => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, StreamEvent::Done)
    }

    /// Frame the event as a single newline-terminated `data:` line.
    pub fn to_line(&self) -> Result<String, CoreError> {
        let payload = match self {
            StreamEvent::Fragment(fragment) => serde_json::to_string(fragment)?,
            StreamEvent::Done => DONE_SENTINEL.to_string(),
        };
        Ok(format!("{DATA_PREFIX}{payload}\n"))
    }
}

/// Concatenate fragment contents in order, ignoring the terminal marker.
pub fn accumulate<'a>(events: impl IntoIterator<Item = &'a StreamEvent>) -> String {
    events
        .into_iter()
        .filter_map(StreamEvent::content)
        .collect()
}
