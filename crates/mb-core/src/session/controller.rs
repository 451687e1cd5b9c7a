//! Turn-taking between a chat session and a responder

use serde::Serialize;
use tracing::{info, warn};

use super::context::contextual_input;
use super::types::{ChatSession, DisplayEntry, Turn};
use crate::responder::Responder;

/// Marker prefixed to replies that stand in for a failed responder call
pub const ERROR_MARKER: &str = "❌";

/// Outcome of one user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exchange {
    /// Exact text handed to the responder
    pub input: String,
    /// Reply appended to the history (the rendered error on failure)
    pub reply: String,
    pub is_error: bool,
}

/// Render a responder failure as a displayable reply
pub fn render_error(err: &crate::Error) -> String {
    format!("{} Sorry, I encountered an error: {}", ERROR_MARKER, err)
}

impl ChatSession {
    /// Run one exchange: record `message`, ask the responder, record the reply
    ///
    /// A responder failure becomes an ordinary assistant turn, so the
    /// session stays usable and the history keeps alternating.
    pub async fn exchange(&mut self, responder: &dyn Responder, message: &str) -> Exchange {
        let prior = self.history.len();
        self.history.push(Turn::user(message));
        self.display.push(DisplayEntry::user(message));

        let input = contextual_input(&self.history.turns()[..prior], self.window, message);

        let exchange = match responder.respond(&input).await {
            Ok(reply) => {
                self.history.push(Turn::assistant(&reply));
                self.display.push(DisplayEntry::assistant(&reply));
                Exchange {
                    input,
                    reply,
                    is_error: false,
                }
            }
            Err(e) => {
                warn!("[Session {}] Responder failed: {}", self.id(), e);
                let reply = render_error(&e);
                self.history.push(Turn::assistant(&reply));
                self.display.push(DisplayEntry::error(&reply));
                Exchange {
                    input,
                    reply,
                    is_error: true,
                }
            }
        };

        self.touch();
        info!(
            "[Session {}] Exchange complete: {} turns in history",
            self.id(),
            self.history.len()
        );

        exchange
    }
}
