//! Route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{
    clear_session, create_session, get_session, health, index, send_message, status,
};
use crate::server::AppState;

/// Create the web router
pub fn routes() -> Router<AppState> {
    Router::new()
        // Chat page
        .route("/", get(index))
        // Health check
        .route("/health", get(health))
        .route("/api/status", get(status))
        // Session management
        .route("/api/sessions", post(create_session))
        .route(
            "/api/sessions/{session_id}",
            get(get_session).delete(clear_session),
        )
        .route("/api/sessions/{session_id}/messages", post(send_message))
}
