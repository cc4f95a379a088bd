//! Axum route handlers for the chat API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::conversation::{to_contents, validate_turns, ChatMessage, Role};
use crate::chat::session::{request_summary, send_message, TurnOutcome};
use crate::errors::{AppError, AppJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionMessageRequest {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReplyResponse {
    pub role: Role,
    pub content: String,
    pub messages: Vec<ChatMessage>,
    pub artifact_refresh: bool,
}

impl From<TurnOutcome> for SessionReplyResponse {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            role: Role::Assistant,
            content: outcome.reply,
            messages: outcome.messages,
            artifact_refresh: outcome.artifact_refresh.is_some(),
        }
    }
}

/// POST /chat
///
/// Stateless: the client sends the whole transcript, preamble included.
pub async fn handle_chat(
    State(state): State<AppState>,
    AppJson(request): AppJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    validate_turns(&request.messages)?;

    let content = state.llm.generate(to_contents(&request.messages)).await?;

    Ok(Json(ChatResponse {
        role: Role::Assistant,
        content,
    }))
}

/// POST /sessions/:id/summary
///
/// Sends the automatic "summarize this resume" turn for a fresh upload.
pub async fn handle_session_summary(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionReplyResponse>, AppError> {
    let outcome = request_summary(&state.sessions, state.llm.clone(), session_id).await?;
    Ok(Json(outcome.into()))
}

/// POST /sessions/:id/messages
pub async fn handle_session_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    AppJson(request): AppJson<SessionMessageRequest>,
) -> Result<Json<SessionReplyResponse>, AppError> {
    let content = request
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Message cannot be empty".to_string()))?;

    let outcome = send_message(
        &state.sessions,
        state.llm.clone(),
        &state.renderer,
        &state.store,
        session_id,
        content.trim(),
    )
    .await?;

    Ok(Json(outcome.into()))
}
