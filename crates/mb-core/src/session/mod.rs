//! Conversation sessions
//!
//! Turn history, bounded context, turn-taking and the in-memory session
//! registry used by the web front-end. Nothing here is persisted.

mod context;
mod controller;
mod manager;
mod types;

pub use context::{build_context, contextual_input, ContextWindow, CONTEXT_SEPARATOR};
pub use controller::{render_error, Exchange, ERROR_MARKER};
pub use manager::{SessionManager, SharedSession};
pub use types::{ChatSession, DisplayEntry, History, Role, Turn};
