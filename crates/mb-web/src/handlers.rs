//! HTTP handlers
//!
//! Chat page, session lifecycle and message exchange.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mb_core::{ChatSession, CredentialStatus, DisplayEntry};

use crate::error::WebError;
use crate::page::INDEX_HTML;
use crate::server::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

// ============================================================================
// Request/Response types
// ============================================================================

/// Message request payload
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

/// Session view rendered by the chat page
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    /// Turns in the conversation history (the greeting is not one)
    pub history_len: usize,
    pub display: Vec<DisplayEntry>,
    pub created_at: String,
    pub updated_at: String,
}

impl SessionResponse {
    fn from_session(session: &ChatSession) -> Self {
        Self {
            session_id: session.id().to_string(),
            history_len: session.history().len(),
            display: session.display_log().to_vec(),
            created_at: session.created_at().to_rfc3339(),
            updated_at: session.updated_at().to_rfc3339(),
        }
    }
}

/// Result of one message
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub session_id: String,
    pub reply: String,
    pub is_error: bool,
    pub history_len: usize,
}

/// Credential and session overview
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Whether chatting is possible at all
    pub ready: bool,
    pub model: String,
    pub credentials: Vec<CredentialStatus>,
    pub warnings: Vec<String>,
    pub sessions: usize,
}

/// Generic API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handler functions
// ============================================================================

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Chat page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Credential status
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = &state.status;
    Json(StatusResponse {
        ready: state.is_ready(),
        model: state.model.clone(),
        credentials: vec![
            status.model_key.clone(),
            status.email_address.clone(),
            status.email_password.clone(),
        ],
        warnings: status.warnings(),
        sessions: state.sessions.len().await,
    })
}

/// Start a new conversation
pub async fn create_session(State(state): State<AppState>) -> ApiResult<SessionResponse> {
    let (_, session) = state.sessions.create().await;
    let session = session.lock().await;
    Ok(Json(SessionResponse::from_session(&session)))
}

/// Current state of a conversation
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionResponse> {
    debug!("Session info request: {}", session_id);

    let session = state.sessions.get(&session_id).await.map_err(WebError::from)?;
    let session = session.lock().await;
    Ok(Json(SessionResponse::from_session(&session)))
}

/// Send one user message and wait for the reply
///
/// Responder failures come back as a normal reply with `is_error` set.
pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> ApiResult<MessageResponse> {
    let session = state.sessions.get(&session_id).await.map_err(WebError::from)?;

    if req.message.trim().is_empty() {
        return Err(WebError::InvalidRequest("message is empty".to_string()).into());
    }

    let responder = state.responder.clone().ok_or_else(|| {
        WebError::Unavailable(
            "OpenAI API Key is missing! Please add OPENAI_API_KEY to your .env file.".to_string(),
        )
    })?;

    // held for the whole exchange: one message in flight per session
    let mut session = session.lock().await;
    if session.id() != session_id {
        // cleared while this request waited for the lock
        return Err(WebError::SessionNotFound(session_id).into());
    }

    let exchange = session.exchange(responder.as_ref(), &req.message).await;

    Ok(Json(MessageResponse {
        session_id,
        reply: exchange.reply,
        is_error: exchange.is_error,
        history_len: session.history().len(),
    }))
}

/// Clear a conversation; it continues under a new id
pub async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionResponse> {
    info!("Clearing session: {}", session_id);

    let new_id = state
        .sessions
        .clear(&session_id)
        .await
        .map_err(WebError::from)?;
    let session = state.sessions.get(&new_id).await.map_err(WebError::from)?;
    let session = session.lock().await;
    Ok(Json(SessionResponse::from_session(&session)))
}
