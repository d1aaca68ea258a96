//! Chat model trait and message types for tool-calling conversations.
//!
//! The types here mirror the Gemini `generateContent` wire shapes so that
//! [`Content`] values can be serialized directly into requests, but the
//! [`ChatModel`] trait itself is backend-neutral: tests drive the agent
//! with scripted in-process models.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::Result;

/// The originator of a [`Content`] entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user (also carries tool results back to the model).
    User,
    /// The language model.
    Model,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    /// Name of the tool to invoke.
    pub name: String,
    /// Arguments as a JSON object.
    #[serde(default)]
    pub args: Value,
}

/// The textual result of a tool invocation, fed back to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionResponse {
    /// Name of the tool that produced the result.
    pub name: String,
    /// Result payload; the agent wraps tool output as `{"result": text}`.
    pub response: Value,
}

/// One part of a [`Content`] entry.
///
/// Untagged so that serialization matches the wire format, where each part
/// is an object with exactly one of the known keys. Unknown part kinds
/// (e.g. thought summaries) fall through to [`Part::Other`] instead of
/// failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Part {
    /// A plain text part.
    Text {
        /// The text content.
        text: String,
    },
    /// A tool invocation request.
    FunctionCall {
        /// The requested invocation.
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },
    /// A tool result.
    FunctionResponse {
        /// The invocation result.
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
    },
    /// Any part kind this crate does not interpret.
    Other(Value),
}

/// One entry in a conversation exchange: a role plus its parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// Who produced this entry.
    pub role: Role,
    /// The entry's parts, in order.
    pub parts: Vec<Part>,
}

impl Content {
    /// A user text entry.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self { role: Role::User, parts: vec![Part::Text { text: text.into() }] }
    }

    /// A model text entry.
    pub fn model_text(text: impl Into<String>) -> Self {
        Self { role: Role::Model, parts: vec![Part::Text { text: text.into() }] }
    }

    /// A user entry carrying tool results back to the model.
    pub fn function_responses(responses: Vec<FunctionResponse>) -> Self {
        Self {
            role: Role::User,
            parts: responses
                .into_iter()
                .map(|function_response| Part::FunctionResponse { function_response })
                .collect(),
        }
    }

    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// All tool invocations requested in this entry, in order.
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::FunctionCall { function_call } => Some(function_call),
                _ => None,
            })
            .collect()
    }
}

/// A tool described to the model: name, purpose, and argument schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionDeclaration {
    /// Tool name the model dispatches on.
    pub name: String,
    /// Natural-language purpose shown to the model.
    pub description: String,
    /// JSON schema for the tool's arguments.
    pub parameters: Value,
}

impl FunctionResponse {
    /// Wrap a tool's textual output in the object shape the model expects.
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), response: json!({ "result": text.into() }) }
    }
}

/// A chat/completion backend supporting tool-calling.
///
/// One call corresponds to one model round: given the system instruction,
/// the exchange so far, and the available tool declarations, the model
/// returns a [`Content`] holding either a final text answer or one or more
/// [`FunctionCall`] parts.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Identifier of the underlying model, for operator introspection.
    fn name(&self) -> &str;

    /// Run one model round over the exchange.
    async fn generate(
        &self,
        system_instruction: &str,
        contents: &[Content],
        tools: &[FunctionDeclaration],
    ) -> Result<Content>;
}
