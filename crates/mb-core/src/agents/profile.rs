//! Agent profiles
//!
//! An agent is a system prompt, a sampling temperature, the tools it may
//! call and the agents it may hand the conversation to.

use serde::{Deserialize, Serialize};

/// Name of the mail-sending tool the sending agent relies on
pub const SEND_EMAIL_TOOL: &str = "send_email";

pub const TRIAGE_AGENT: &str = "Email Bot Triage";
pub const CHAT_AGENT: &str = "Core Chat Agent";
pub const DRAFT_AGENT: &str = "Email Drafting Agent";
pub const SEND_AGENT: &str = "Email Sending Agent";

/// Static description of one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub name: String,
    pub instructions: String,
    pub temperature: f32,
    /// Registered tool names this agent may call
    #[serde(default)]
    pub tools: Vec<String>,
    /// Names of agents this agent may hand off to
    #[serde(default)]
    pub handoffs: Vec<String>,
}

impl AgentProfile {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            temperature: 0.2,
            tools: vec![],
            handoffs: vec![],
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tools.push(tool.into());
        self
    }

    pub fn with_handoff(mut self, agent: impl Into<String>) -> Self {
        self.handoffs.push(agent.into());
        self
    }
}

/// `transfer_to_<snake_case_name>`
pub fn handoff_tool_name(agent_name: &str) -> String {
    let mut snake = String::with_capacity(agent_name.len());
    for c in agent_name.chars() {
        if c.is_ascii_alphanumeric() {
            snake.push(c.to_ascii_lowercase());
        } else if !snake.ends_with('_') {
            snake.push('_');
        }
    }
    format!("transfer_to_{}", snake.trim_matches('_'))
}

/// The email assistant's agents; the first one receives every message
pub fn default_agents() -> Vec<AgentProfile> {
    vec![
        AgentProfile::new(
            TRIAGE_AGENT,
            "You are the main email bot assistant. Direct conversations appropriately:\n\n\
             - For general chat and questions → handoff to Core Chat Agent, or respond normally if trivial\n\
             - If user wants to write/draft an email → handoff to Email Drafting Agent\n\
             - If user says 'send' or wants to actually send an email → IMMEDIATELY handoff to Email Sending Agent\n\
             - Keywords for sending: 'send', 'email to', 'send this', 'send it', 'actually send'\n\n\
             When user says 'send this to [email]' or similar - handoff to Email Sending Agent right away!\n\
             Be friendly and helpful!",
        )
        .with_temperature(0.1)
        .with_handoff(CHAT_AGENT)
        .with_handoff(DRAFT_AGENT)
        .with_handoff(SEND_AGENT),
        AgentProfile::new(
            CHAT_AGENT,
            "You are a friendly assistant. Keep answers short, clear, and helpful. \
             Answer general questions and provide helpful information.",
        )
        .with_temperature(0.2),
        AgentProfile::new(
            DRAFT_AGENT,
            "You are an assistant that writes email drafts. \
             When asked, generate a clear subject line and professional email body. \
             Ask for recipient, purpose, and any specific details needed. \
             Keep emails polite, professional, and concise.",
        )
        .with_temperature(0.3),
        AgentProfile::new(
            SEND_AGENT,
            "You are responsible for sending emails. \
             Ask user for recipient, subject, and body if not provided. \
             Once you have all details, use the send_email tool to send the email. \
             Confirm with user before sending.",
        )
        .with_temperature(0.2)
        .with_tool(SEND_EMAIL_TOOL),
    ]
}
