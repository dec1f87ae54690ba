use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::StreamExt;
use serde::Serialize;

use neurostudy_core::models::chat::ChatRequest;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ChatSimpleResponse {
    pub content: String,
}

/// Stream an assistant answer as `data:` lines ending in `data: [DONE]`.
///
/// Provider failures never surface here: the relay degrades to a fallback
/// answer or a failure notice inside the stream. Only invalid requests are
/// rejected.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let body = state
        .relay
        .stream_chat(request)
        .map(|event| event.to_line().map(Bytes::from));

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert("x-accel-buffering", HeaderValue::from_static("no"));

    Ok((headers, Body::from_stream(body)).into_response())
}

/// Non-streaming chat turn, used by callers when `/api/chat` is unusable.
pub async fn chat_simple(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatSimpleResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let content = state.relay.complete(&request).await;
    Ok(Json(ChatSimpleResponse { content }))
}
