use axum::{Json, extract::Path, extract::State};
use std::sync::Arc;
use tabletalk_core::ChatSession;
use tabletalk_service::{ChatReply, SessionSummary};

use crate::AppState;
use crate::api_error::ApiError;
use crate::api_types::ChatRequest;

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let reply = state.chat_service.chat(&req.message, req.session_id.as_deref()).await?;
    Ok(Json(reply))
}

pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionSummary>> {
    Json(state.sessions.list().await)
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<ChatSession>, ApiError> {
    state
        .sessions
        .snapshot(&session_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("session '{session_id}' not found")))
}
