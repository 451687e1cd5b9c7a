//! Agents and the triage responder

pub mod profile;
pub mod triage;

pub use profile::{
    default_agents, handoff_tool_name, AgentProfile, CHAT_AGENT, DRAFT_AGENT, SEND_AGENT,
    SEND_EMAIL_TOOL, TRIAGE_AGENT,
};
pub use triage::{TriageResponder, TriageRun, DEFAULT_MAX_ITERATIONS};
