//! Prompt assembly for document-grounded chat.
//!
//! The study document is injected verbatim into the system prompt inside a
//! `<study_material>` block. It is not chunked or retrieved: the caller
//! decides how much of the document to send.

use neurostudy_core::models::chat::{ChatRequest, ChatRole};

use crate::provider::ProviderMessage;

const CHAT_SYSTEM_PROMPT: &str = "\
You are NeuroStudy, a study assistant. \
Answer the student's questions using only the study material below. \
If the material does not cover the question, say so plainly.";

/// Wrap document text in a `<study_material>` block.
///
/// Returns an empty string for blank documents.
pub fn build_context_block(document: &str) -> String {
    if document.trim().is_empty() {
        return String::new();
    }

    let mut block = String::from("<study_material>\n");
    block.push_str(document);
    if !document.ends_with('\n') {
        block.push('\n');
    }
    block.push_str("</study_material>");
    block
}

/// System prompt for a chat turn grounded in `document`.
pub fn build_system_prompt(document: &str) -> String {
    let block = build_context_block(document);
    if block.is_empty() {
        return CHAT_SYSTEM_PROMPT.to_string();
    }
    format!("{CHAT_SYSTEM_PROMPT}\n\n{block}")
}

/// Provider messages for a chat request: system prompt, history in order,
/// then the new message as the final user turn.
pub fn build_messages(request: &ChatRequest) -> Vec<ProviderMessage> {
    let mut messages = Vec::with_capacity(request.conversation_history.len() + 2);
    messages.push(ProviderMessage::system(build_system_prompt(
        &request.document_content,
    )));

    for turn in &request.conversation_history {
        messages.push(match turn.role {
            ChatRole::User => ProviderMessage::user(turn.content.clone()),
            ChatRole::Assistant => ProviderMessage::assistant(turn.content.clone()),
        });
    }

    messages.push(ProviderMessage::user(request.message.clone()));
    messages
}
