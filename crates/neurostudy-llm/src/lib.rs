//! neurostudy-llm
//!
//! LLM provider access, streamed-response decoding, and the chat relay.

pub mod context;
pub mod error;
pub mod openai;
pub mod provider;
pub mod relay;
pub mod sse;
pub mod study;
