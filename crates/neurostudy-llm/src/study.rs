//! Single-shot study material generation: flashcards and quizzes.
//!
//! Each generator sends the document with a system prompt asking for a JSON
//! array and parses the reply. Models often wrap JSON in a Markdown code
//! fence or add a sentence before it, so [`extract_json_array`] narrows the
//! reply to the outermost `[...]` before parsing.

use neurostudy_core::models::study::{Flashcard, QuizQuestion};
use serde::de::DeserializeOwned;
use tracing::info;
use uuid::Uuid;

use crate::context::build_context_block;
use crate::error::LlmError;
use crate::provider::{ChatProvider, ProviderMessage};

pub const DEFAULT_ITEM_COUNT: usize = 10;
pub const MAX_ITEM_COUNT: usize = 50;

const FLASHCARD_SYSTEM_PROMPT: &str = "\
You create study flashcards from the study material you are given. \
Respond with a JSON array only, no prose. Each element must be an object \
with string fields \"question\" and \"answer\". Keep answers short.";

const QUIZ_SYSTEM_PROMPT: &str = "\
You create multiple-choice quizzes from the study material you are given. \
Respond with a JSON array only, no prose. Each element must be an object with \
\"question\" (string), \"options\" (array of 4 strings), \"correctAnswer\" \
(zero-based index into options), and \"explanation\" (string).";

/// Requested item count, defaulted and clamped to `1..=MAX_ITEM_COUNT`.
pub fn clamp_count(count: Option<usize>) -> usize {
    count.unwrap_or(DEFAULT_ITEM_COUNT).clamp(1, MAX_ITEM_COUNT)
}

pub async fn generate_flashcards(
    provider: &dyn ChatProvider,
    document: &str,
    count: usize,
) -> Result<Vec<Flashcard>, LlmError> {
    let generation_id = Uuid::new_v4();
    info!(generation_id = %generation_id, provider = provider.name(), count, "generating flashcards");

    let mut cards: Vec<Flashcard> =
        generate_items(provider, FLASHCARD_SYSTEM_PROMPT, document, count).await?;
    cards.truncate(count);

    if cards.is_empty() {
        return Err(LlmError::SchemaViolation("model returned no flashcards".to_string()));
    }

    info!(generation_id = %generation_id, generated = cards.len(), "flashcard generation complete");
    Ok(cards)
}

pub async fn generate_quiz(
    provider: &dyn ChatProvider,
    document: &str,
    count: usize,
) -> Result<Vec<QuizQuestion>, LlmError> {
    let generation_id = Uuid::new_v4();
    info!(generation_id = %generation_id, provider = provider.name(), count, "generating quiz");

    let mut questions: Vec<QuizQuestion> =
        generate_items(provider, QUIZ_SYSTEM_PROMPT, document, count).await?;
    questions.truncate(count);

    if questions.is_empty() {
        return Err(LlmError::SchemaViolation("model returned no questions".to_string()));
    }
    if let Some(bad) = questions.iter().position(|q| !q.has_valid_answer()) {
        return Err(LlmError::SchemaViolation(format!(
            "question {bad} has an out-of-range correctAnswer"
        )));
    }

    info!(generation_id = %generation_id, generated = questions.len(), "quiz generation complete");
    Ok(questions)
}

async fn generate_items<T: DeserializeOwned>(
    provider: &dyn ChatProvider,
    system_prompt: &str,
    document: &str,
    count: usize,
) -> Result<Vec<T>, LlmError> {
    let messages = [
        ProviderMessage::system(system_prompt),
        ProviderMessage::user(format!(
            "Create {count} items from this material.\n\n{}",
            build_context_block(document)
        )),
    ];

    let reply = provider.complete_chat(&messages).await?;
    let json = extract_json_array(&reply)
        .ok_or_else(|| LlmError::SchemaViolation(format!("no JSON array in reply: {reply}")))?;

    serde_json::from_str(json)
        .map_err(|e| LlmError::SchemaViolation(format!("failed to parse items: {e}. Reply: {reply}")))
}

/// The outermost `[...]` span of `text`, if any.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}
