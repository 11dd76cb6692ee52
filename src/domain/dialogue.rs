//! Transcript and tool-calling shapes exchanged with the dialogue engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry in the conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum DialogueMessage {
    System { content: String },
    User { content: String },
    Assistant {
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool { call_id: String, content: String },
}

/// A request from the model to run one named action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// An action advertised to the model, with a JSON Schema for its arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// What the model produced for one round: text, tool calls, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogueTurn {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}
