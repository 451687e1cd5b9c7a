//! mb-core: Mailbot core library
//!
//! LLM client, tool system, agents and conversation sessions shared by the
//! web and terminal front-ends.

pub mod agents;
pub mod config;
pub mod error;
pub mod llm;
pub mod responder;
pub mod session;
pub mod tool;

pub use agents::{AgentProfile, TriageResponder};
pub use config::{
    Config, ConfigStatus, CredentialStatus, EmailConfig, LlmConfig, LlmProvider, WebConfig,
    CONFIG_FILE,
};
pub use error::{Error, Result};
pub use llm::{LlmClient, Message, MessageContent, ToolDefinition};
pub use responder::Responder;
pub use session::{
    build_context, contextual_input, ChatSession, ContextWindow, DisplayEntry, Exchange,
    SessionManager, SharedSession, Turn,
};
pub use tool::{Tool, ToolManager, ToolResult};
