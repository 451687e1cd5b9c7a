//! Responder boundary
//!
//! A responder turns one input text into one reply text. How it gets
//! there (which agent, which tools) is its own business.

use async_trait::async_trait;

use crate::Result;

/// Produces a reply for a (possibly context-prefixed) message
///
/// The call may take arbitrarily long and may fail; callers decide how a
/// failure is presented.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, input: &str) -> Result<String>;
}
