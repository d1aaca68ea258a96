//! The tool-augmented conversation agent.
//!
//! [`SupportAgent`] owns one session's message memory and drives the
//! per-turn state machine: compose a request from the system prompt, the
//! session history, and the tool declarations; invoke the model; execute
//! any requested tools in order and feed the results back; repeat until
//! the model produces a final answer or the round cap is hit. Every turn
//! failure is converted to a user-facing apology that is itself recorded
//! in memory, so the conversation log always reflects what the user saw.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::error::{Result, SupportError};
use crate::model::{ChatModel, Content, FunctionResponse};
use crate::tool::ToolRegistry;

/// Upper bound on sequential tool-invocation rounds within one turn.
/// Reaching the cap is a fatal turn failure, bounding the cost of a
/// misbehaving model.
pub const MAX_TOOL_ROUNDS: usize = 8;

/// System instructions composed into every model request.
const SYSTEM_PROMPT: &str = "You are an AI Customer Support Agent. Help customers efficiently by:\n\
1. Understanding their issues\n\
2. Searching knowledge base for solutions\n\
3. Providing clear, helpful responses\n\
4. Creating tickets when needed\n\
5. Escalating complex issues\n\n\
Be professional and concise. Use available tools to search knowledge base, \
create tickets, and escalate issues.";

/// Apology returned (and recorded) when a turn fails for any reason.
pub const APOLOGY_MESSAGE: &str = "I apologize, but I encountered an error while processing \
your request. Please try again or contact human support if the issue persists.";

/// Who produced a [`ChatMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The end user.
    User,
    /// The agent's final answer for a turn.
    Agent,
}

/// One recorded conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Who produced the message.
    pub role: MessageRole,
    /// The message text.
    pub content: String,
}

/// Operator-facing snapshot of the agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStatus {
    /// Identifier of the underlying model.
    pub model: String,
    /// Sampling temperature in use.
    pub temperature: f32,
    /// Maximum output tokens per model call.
    pub max_output_tokens: u32,
    /// Number of messages currently in session memory.
    pub memory_length: usize,
    /// Number of registered tools.
    pub tool_count: usize,
}

/// A single-session conversation agent with tool dispatch.
///
/// Turns are strictly sequential: session memory is mutated in place, so
/// one turn must complete before the next is accepted. The borrow checker
/// enforces this through the `&mut self` receiver.
pub struct SupportAgent {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    memory: Vec<ChatMessage>,
    temperature: f32,
    max_output_tokens: u32,
}

impl SupportAgent {
    /// Create an agent over the given model and tool registry.
    ///
    /// `temperature` and `max_output_tokens` are reported through
    /// [`status`](Self::status); the model client applies the same values
    /// to its requests.
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: ToolRegistry,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Self {
        Self { model, tools, memory: Vec::new(), temperature, max_output_tokens }
    }

    /// Process one user turn and return the agent's answer.
    ///
    /// Never fails past this boundary: any error while composing, invoking
    /// the model, or running tools is logged and converted to
    /// [`APOLOGY_MESSAGE`], which is appended to memory as the turn's
    /// answer and returned.
    pub async fn process_message(&mut self, user_message: &str) -> String {
        self.memory.push(ChatMessage {
            role: MessageRole::User,
            content: user_message.to_string(),
        });

        match self.run_turn().await {
            Ok(answer) => {
                self.memory.push(ChatMessage { role: MessageRole::Agent, content: answer.clone() });
                answer
            }
            Err(e) => {
                error!(error = %e, "turn failed");
                self.memory.push(ChatMessage {
                    role: MessageRole::Agent,
                    content: APOLOGY_MESSAGE.to_string(),
                });
                APOLOGY_MESSAGE.to_string()
            }
        }
    }

    /// Drive model rounds and tool dispatch until a final answer emerges.
    async fn run_turn(&self) -> Result<String> {
        let mut contents: Vec<Content> = self
            .memory
            .iter()
            .map(|m| match m.role {
                MessageRole::User => Content::user_text(&m.content),
                MessageRole::Agent => Content::model_text(&m.content),
            })
            .collect();
        let declarations = self.tools.declarations();

        for round in 0..MAX_TOOL_ROUNDS {
            let reply = self.model.generate(SYSTEM_PROMPT, &contents, &declarations).await?;

            let calls: Vec<_> = reply.function_calls().into_iter().cloned().collect();
            if calls.is_empty() {
                let answer = reply.text();
                info!(rounds = round + 1, "turn completed");
                return Ok(answer);
            }

            let mut responses = Vec::with_capacity(calls.len());
            for call in &calls {
                let result = self.tools.dispatch(&call.name, call.args.clone()).await?;
                responses.push(FunctionResponse::from_text(&call.name, result));
            }

            contents.push(reply);
            contents.push(Content::function_responses(responses));
        }

        Err(SupportError::ToolRoundLimit(MAX_TOOL_ROUNDS))
    }

    /// Read-only snapshot of the session memory.
    pub fn history(&self) -> &[ChatMessage] {
        &self.memory
    }

    /// Empty the session memory. Irreversible and idempotent.
    pub fn clear(&mut self) {
        self.memory.clear();
        info!("conversation memory cleared");
    }

    /// Operator introspection over the agent's configuration and state.
    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            model: self.model.name().to_string(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            memory_length: self.memory.len(),
            tool_count: self.tools.len(),
        }
    }
}
