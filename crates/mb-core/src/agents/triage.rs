//! Triage responder
//!
//! Every message starts at the entry agent. An agent answers directly,
//! calls one of its tools, or hands the conversation to another agent by
//! calling a `transfer_to_*` tool. The loop ends at the first plain answer.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use super::profile::{default_agents, handoff_tool_name, AgentProfile};
use crate::llm::{LlmClient, Message, MessageContent, ToolDefinition};
use crate::responder::Responder;
use crate::tool::{SchemaBuilder, ToolManager, ToolResult};
use crate::{Error, Result};

/// Upper bound on model calls for one message
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

const DEFAULT_MAX_TOKENS: u64 = 4096;

/// Outcome of one triage run
#[derive(Debug, Clone)]
pub struct TriageRun {
    pub output: String,
    /// Agent that produced the final answer
    pub agent: String,
    pub iterations: usize,
    /// Names of tools executed along the way (hand-offs excluded)
    pub tool_calls: Vec<String>,
}

/// Multi-agent responder backed by an LLM client
pub struct TriageResponder {
    client: LlmClient,
    tools: Arc<ToolManager>,
    agents: HashMap<String, AgentProfile>,
    entry: String,
    max_iterations: usize,
}

impl TriageResponder {
    /// Responder over the default email assistant agents
    pub fn new(client: LlmClient, tools: Arc<ToolManager>) -> Self {
        let agents = default_agents();
        let entry = agents[0].name.clone();
        Self {
            client,
            tools,
            agents: agents.into_iter().map(|a| (a.name.clone(), a)).collect(),
            entry,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Responder over custom agents; the first one is the entry point
    ///
    /// # Errors
    /// Fails when the list is empty or a hand-off names an unknown agent.
    pub fn with_agents(
        client: LlmClient,
        tools: Arc<ToolManager>,
        agents: Vec<AgentProfile>,
    ) -> Result<Self> {
        let entry = agents
            .first()
            .map(|a| a.name.clone())
            .ok_or_else(|| Error::Agent("No agents configured".to_string()))?;

        let agents: HashMap<String, AgentProfile> =
            agents.into_iter().map(|a| (a.name.clone(), a)).collect();

        for agent in agents.values() {
            if let Some(missing) = agent.handoffs.iter().find(|t| !agents.contains_key(*t)) {
                return Err(Error::Agent(format!(
                    "{} hands off to unknown agent {}",
                    agent.name, missing
                )));
            }
        }

        Ok(Self {
            client,
            tools,
            agents,
            entry,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        })
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn agent(&self, name: &str) -> Result<&AgentProfile> {
        self.agents
            .get(name)
            .ok_or_else(|| Error::Agent(format!("Unknown agent: {}", name)))
    }

    /// Tools offered to `agent`: its own tools followed by its hand-offs
    fn tool_definitions(&self, agent: &AgentProfile) -> Vec<ToolDefinition> {
        let mut definitions = self.tools.definitions_for(&agent.tools);
        for target in &agent.handoffs {
            definitions.push(ToolDefinition::new(
                handoff_tool_name(target),
                format!("Handoff to the {} to handle the request.", target),
                SchemaBuilder::empty_object(),
            ));
        }
        definitions
    }

    fn handoff_target(&self, agent: &AgentProfile, tool_name: &str) -> Option<&AgentProfile> {
        agent
            .handoffs
            .iter()
            .find(|t| handoff_tool_name(t) == tool_name)
            .and_then(|t| self.agents.get(t))
    }

    async fn execute_tool(&self, agent: &AgentProfile, name: &str, input: serde_json::Value) -> ToolResult {
        if !agent.tools.iter().any(|t| t == name) {
            warn!("{} requested unavailable tool: {}", agent.name, name);
            return ToolResult::error(format!("Unknown tool: {}", name));
        }

        debug!("Executing tool: {} with input: {:?}", name, input);
        self.tools
            .execute(name, input)
            .await
            .unwrap_or_else(|e| ToolResult::error(e.to_string()))
    }

    /// Run the agent loop for one input
    pub async fn run(&self, input: &str) -> Result<TriageRun> {
        let mut agent = self.agent(&self.entry)?;
        let mut messages = vec![Message::user(input)];
        let mut tool_calls = Vec::new();

        for iteration in 1..=self.max_iterations {
            let request = self
                .client
                .request_builder()
                .system(&agent.instructions)
                .temperature(agent.temperature)
                .max_tokens(DEFAULT_MAX_TOKENS)
                .messages(messages.clone())
                .tools(self.tool_definitions(agent))
                .build();

            let response = self.client.messages(request).await?;

            match response.stop_reason.as_str() {
                "end_turn" | "stop_sequence" | "stop" | "max_tokens" | "length" => {
                    info!("{} answered after {} iteration(s)", agent.name, iteration);
                    return Ok(TriageRun {
                        output: response.text(),
                        agent: agent.name.clone(),
                        iterations: iteration,
                        tool_calls,
                    });
                }
                "tool_use" | "tool_calls" => {
                    let uses = response.tool_uses();
                    if uses.is_empty() {
                        warn!("{} stopped for tool use without calling a tool", agent.name);
                        return Ok(TriageRun {
                            output: response.text(),
                            agent: agent.name.clone(),
                            iterations: iteration,
                            tool_calls,
                        });
                    }

                    let mut results = Vec::with_capacity(uses.len());
                    let mut next_agent = None;

                    for (id, name, input) in uses {
                        let result = match self.handoff_target(agent, &name) {
                            Some(target) => {
                                // first hand-off in a response wins
                                next_agent.get_or_insert(target);
                                ToolResult::success(json!({ "assistant": target.name }).to_string())
                            }
                            None => {
                                let result = self.execute_tool(agent, &name, input).await;
                                tool_calls.push(name);
                                result
                            }
                        };

                        results.push(MessageContent::ToolResult {
                            tool_use_id: id,
                            content: result.output,
                            is_error: result.is_error,
                        });
                    }

                    messages.push(Message {
                        role: "assistant".to_string(),
                        content: response.content,
                    });
                    messages.push(Message {
                        role: "user".to_string(),
                        content: results,
                    });

                    if let Some(target) = next_agent {
                        info!("Handoff: {} -> {}", agent.name, target.name);
                        agent = target;
                    }
                }
                other => {
                    return Err(Error::Agent(format!("Unknown stop_reason: {}", other)));
                }
            }
        }

        Err(Error::Agent(format!(
            "Max iterations reached ({})",
            self.max_iterations
        )))
    }
}

#[async_trait]
impl Responder for TriageResponder {
    async fn respond(&self, input: &str) -> Result<String> {
        self.run(input).await.map(|run| run.output)
    }
}
