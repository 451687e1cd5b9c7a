//! Web server
//!
//! Starts and manages the axum-based HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use mb_core::{ConfigStatus, ContextWindow, Responder, SessionManager, WebConfig};

use crate::error::{Result, WebError};
use crate::page::WELCOME_MESSAGE;
use crate::routes::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub status: Arc<ConfigStatus>,
    pub model: String,
    /// Absent when no model credential is configured
    pub responder: Option<Arc<dyn Responder>>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(
        status: ConfigStatus,
        model: impl Into<String>,
        responder: Option<Arc<dyn Responder>>,
    ) -> Self {
        Self {
            status: Arc::new(status),
            model: model.into(),
            responder,
            sessions: Arc::new(SessionManager::with_greeting(
                ContextWindow::WEB,
                WELCOME_MESSAGE,
            )),
        }
    }

    /// Drop sessions idle for longer than `ttl`; zero keeps them forever
    pub fn with_session_idle(mut self, ttl: Duration) -> Self {
        if !ttl.is_zero() {
            self.sessions = Arc::new(
                SessionManager::with_greeting(ContextWindow::WEB, WELCOME_MESSAGE)
                    .with_idle_ttl(ttl),
            );
        }
        self
    }

    /// Whether messages can be answered
    pub fn is_ready(&self) -> bool {
        self.status.can_chat() && self.responder.is_some()
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn socket_addr(config: &WebConfig) -> Result<SocketAddr> {
    format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| WebError::Server(format!("Invalid address: {}", e)))
}

/// Start the web server; returns after Ctrl-C
pub async fn start_server(config: &WebConfig, state: AppState) -> Result<()> {
    let addr = socket_addr(config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| WebError::Server(format!("Failed to bind {}: {}", addr, e)))?;
    info!("Web UI listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
