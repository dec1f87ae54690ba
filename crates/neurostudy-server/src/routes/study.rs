use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use neurostudy_core::models::study::{Flashcard, QuizQuestion};
use neurostudy_llm::study::{self, clamp_count};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub document_content: String,
    #[serde(default)]
    pub count: Option<usize>,
}

impl GenerateRequest {
    fn document(&self) -> Result<&str, ApiError> {
        if self.document_content.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "missing required field: documentContent".to_string(),
            ));
        }
        Ok(&self.document_content)
    }
}

#[derive(Serialize)]
pub struct FlashcardsResponse {
    pub flashcards: Vec<Flashcard>,
}

#[derive(Serialize)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestion>,
}

pub async fn generate_flashcards(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<FlashcardsResponse>, ApiError> {
    let Json(req) = payload?;
    let document = req.document()?;

    let flashcards =
        study::generate_flashcards(state.generator.as_ref(), document, clamp_count(req.count))
            .await?;

    Ok(Json(FlashcardsResponse { flashcards }))
}

pub async fn generate_quiz(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<QuizResponse>, ApiError> {
    let Json(req) = payload?;
    let document = req.document()?;

    let questions =
        study::generate_quiz(state.generator.as_ref(), document, clamp_count(req.count)).await?;

    Ok(Json(QuizResponse { questions }))
}
