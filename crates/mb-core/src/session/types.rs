//! Session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::context::ContextWindow;

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Title-cased label used when rendering context
    pub fn title(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One message exchanged in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Ordered turn log of a session
///
/// Only grows, until the owning session is cleared.
#[derive(Debug, Clone, Default, Serialize)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.turns.clear();
    }
}

/// A line rendered by a front-end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayEntry {
    pub role: Role,
    pub text: String,
    #[serde(default)]
    pub is_error: bool,
}

impl DisplayEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            is_error: false,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            is_error: true,
        }
    }
}

/// A conversation: opaque id, turn history and display log
///
/// The display log may hold entries that are not part of the history,
/// such as the greeting shown by the web front-end.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: String,
    pub(crate) history: History,
    pub(crate) display: Vec<DisplayEntry>,
    pub(crate) window: ContextWindow,
    greeting: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create a new session with a fresh id and empty history
    pub fn new(window: ContextWindow) -> Self {
        let now = Utc::now();
        Self {
            id: new_session_id(),
            history: History::new(),
            display: Vec::new(),
            window,
            greeting: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a session whose display log starts with a greeting
    pub fn with_greeting(window: ContextWindow, greeting: impl Into<String>) -> Self {
        let mut session = Self::new(window);
        let greeting = greeting.into();
        session.display.push(DisplayEntry::assistant(&greeting));
        session.greeting = Some(greeting);
        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn display_log(&self) -> &[DisplayEntry] {
        &self.display
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Discard history and display log and regenerate the id
    ///
    /// Returns the new id.
    pub fn clear(&mut self) -> String {
        self.history.clear();
        self.display.clear();
        if let Some(greeting) = &self.greeting {
            self.display.push(DisplayEntry::assistant(greeting));
        }
        self.id = new_session_id();
        let now = Utc::now();
        self.created_at = now;
        self.updated_at = now;
        self.id.clone()
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
