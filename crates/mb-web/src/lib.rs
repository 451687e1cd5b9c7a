//! mb-web: Web front-end for mailbot
//!
//! Serves the chat page and the JSON session API it talks to.
//! Built with axum for async HTTP handling.

pub mod error;
pub mod handlers;
pub mod page;
pub mod routes;
pub mod server;

pub use error::{Result, WebError};
pub use server::{router, start_server, AppState};
