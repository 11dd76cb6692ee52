//! OpenAI-compatible adapter for the intake dialogue.
//!
//! Supports OpenAI API, Azure OpenAI, and local Ollama instances.
//! Implements `DialoguePort` with function-style tool calling.

use crate::domain::{DialogueMessage, DialogueTurn, DomainError, ToolCall, ToolSpec};
use crate::ports::DialoguePort;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// OpenAI-compatible chat completions adapter.
///
/// Can be configured to work with:
/// - OpenAI API (api.openai.com)
/// - Azure OpenAI
/// - Ollama (localhost)
/// - Any OpenAI-compatible API with tool calling
pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiAdapter {
    /// Create a new OpenAI adapter.
    ///
    /// # Arguments
    /// * `api_url` - API endpoint (e.g., "https://api.openai.com/v1/chat/completions")
    /// * `api_key` - API key (can be empty for local Ollama)
    /// * `model` - Model name (e.g., "gpt-4o-mini", "llama3.2")
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }

    fn build_request(
        &self,
        instructions: &str,
        history: &[DialogueMessage],
        tools: &[ToolSpec],
    ) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::text("system", instructions));
        messages.extend(history.iter().map(ChatMessage::from));

        ChatRequest {
            model: self.model.clone(),
            messages,
            tools: tools
                .iter()
                .map(|t| ToolDefinition {
                    kind: "function",
                    function: FunctionDefinition {
                        name: t.name.to_string(),
                        description: t.description.to_string(),
                        parameters: t.parameters.clone(),
                    },
                })
                .collect(),
            temperature: 0.3,
        }
    }

    fn into_turn(response: ChatResponse) -> Result<DialogueTurn, DomainError> {
        let message = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| DomainError::Dialogue("No response choices returned".to_string()))?;

        let tool_calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                name: call.function.name,
                arguments: parse_arguments(&call.function.arguments),
            })
            .collect();

        Ok(DialogueTurn {
            text: message.content.filter(|c| !c.trim().is_empty()),
            tool_calls,
        })
    }
}

/// Tool arguments arrive as a JSON-encoded string. Undecodable text is passed
/// through as a JSON string so the action boundary can reject it.
fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// OpenAI API request structure.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDefinition>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

impl From<&DialogueMessage> for ChatMessage {
    fn from(message: &DialogueMessage) -> Self {
        match message {
            DialogueMessage::System { content } => Self::text("system", content),
            DialogueMessage::User { content } => Self::text("user", content),
            DialogueMessage::Assistant {
                content,
                tool_calls,
            } => Self {
                role: "assistant".to_string(),
                content: content.clone(),
                tool_calls: (!tool_calls.is_empty()).then(|| {
                    tool_calls
                        .iter()
                        .map(|call| WireToolCall {
                            id: call.id.clone(),
                            kind: "function".to_string(),
                            function: WireFunction {
                                name: call.name.clone(),
                                arguments: call.arguments.to_string(),
                            },
                        })
                        .collect()
                }),
                tool_call_id: None,
            },
            DialogueMessage::Tool { call_id, content } => Self {
                role: "tool".to_string(),
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: Some(call_id.clone()),
            },
        }
    }
}

#[derive(Serialize)]
struct ToolDefinition {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionDefinition,
}

#[derive(Serialize)]
struct FunctionDefinition {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunction,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

/// OpenAI API response structure.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[async_trait::async_trait]
impl DialoguePort for OpenAiAdapter {
    async fn next_turn(
        &self,
        instructions: &str,
        history: &[DialogueMessage],
        tools: &[ToolSpec],
    ) -> Result<DialogueTurn, DomainError> {
        debug!(
            history_len = history.len(),
            tools = tools.len(),
            "sending transcript to dialogue model"
        );

        let request = self.build_request(instructions, history, tools);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Dialogue(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "AI API returned error");
            return Err(DomainError::Dialogue(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Dialogue(format!("Failed to parse API response: {}", e)))?;

        let turn = Self::into_turn(chat_response)?;
        info!(
            tool_calls = turn.tool_calls.len(),
            has_text = turn.text.is_some(),
            "dialogue turn received"
        );
        Ok(turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;
    use serde_json::json;

    fn adapter(url: &str) -> OpenAiAdapter {
        OpenAiAdapter::new(url.to_string(), "sk-test".to_string(), "gpt-4o-mini".to_string())
    }

    fn save_tool() -> ToolSpec {
        ToolSpec {
            name: "save_patient_data",
            description: "Save one intake field",
            parameters: json!({"type": "object", "properties": {}}),
        }
    }

    #[test]
    fn test_request_wire_shape() {
        let history = vec![
            DialogueMessage::User {
                content: "My name is Jo".to_string(),
            },
            DialogueMessage::Assistant {
                content: None,
                tool_calls: vec![ToolCall {
                    id: "call_1".to_string(),
                    name: "save_patient_data".to_string(),
                    arguments: json!({"field_name": "patient_name", "field_value": "Jo"}),
                }],
            },
            DialogueMessage::Tool {
                call_id: "call_1".to_string(),
                content: r#"{"success":true}"#.to_string(),
            },
        ];

        let request = adapter("http://unused").build_request("Be kind.", &history, &[save_tool()]);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "Be kind.");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][2]["tool_calls"][0]["type"], "function");
        let args = json["messages"][2]["tool_calls"][0]["function"]["arguments"]
            .as_str()
            .unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(args).unwrap()["field_value"],
            "Jo"
        );
        assert_eq!(json["messages"][3]["role"], "tool");
        assert_eq!(json["messages"][3]["tool_call_id"], "call_1");
        assert_eq!(json["tools"][0]["function"]["name"], "save_patient_data");
    }

    #[test]
    fn test_into_turn_parses_tool_calls() {
        let raw = json!({"choices": [{"message": {
            "role": "assistant",
            "content": null,
            "tool_calls": [{"id": "call_9", "type": "function", "function": {
                "name": "get_next_appointment",
                "arguments": "{\"provider_preference\":\"Lane\"}"
            }}]
        }}]});
        let response: ChatResponse = serde_json::from_value(raw).unwrap();
        let turn = OpenAiAdapter::into_turn(response).unwrap();
        assert!(turn.text.is_none());
        assert_eq!(turn.tool_calls.len(), 1);
        assert_eq!(turn.tool_calls[0].name, "get_next_appointment");
        assert_eq!(turn.tool_calls[0].arguments["provider_preference"], "Lane");
    }

    #[test]
    fn test_into_turn_without_choices_is_error() {
        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(OpenAiAdapter::into_turn(response).is_err());
    }

    #[test]
    fn test_parse_arguments_edge_cases() {
        assert_eq!(parse_arguments(""), json!({}));
        assert_eq!(parse_arguments("{oops"), json!("{oops"));
    }

    #[tokio::test]
    async fn test_next_turn_round_trip() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "Hello! What is your name?"}}]});
        let (url, request) = serve_once(200, &body.to_string()).await;

        let turn = adapter(&url)
            .next_turn("Be kind.", &[], &[save_tool()])
            .await
            .unwrap();
        assert_eq!(turn.text.as_deref(), Some("Hello! What is your name?"));
        assert!(turn.tool_calls.is_empty());

        let raw = request.await.unwrap();
        assert!(raw.to_lowercase().contains("authorization: bearer sk-test"));
    }

    #[tokio::test]
    async fn test_next_turn_http_error() {
        let (url, _request) = serve_once(500, r#"{"error":"boom"}"#).await;
        let err = adapter(&url).next_turn("x", &[], &[]).await.unwrap_err();
        assert!(matches!(err, DomainError::Dialogue(_)));
    }
}
