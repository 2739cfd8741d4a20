use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
}

/// Token usage statistics from the API response
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Message,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "default_call_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

fn default_call_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FunctionCall {
    pub name: String,
    /// Raw JSON text as emitted by the model; may be malformed.
    #[serde(default)]
    pub arguments: String,
}

/// Trait for LLM clients to allow mocking and abstraction
pub trait LlmClient {
    fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

impl<T: LlmClient + ?Sized> LlmClient for &T {
    fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        (**self).chat(request)
    }
}

/// Blocking client for OpenAI-compatible `/chat/completions` endpoints.
pub struct Client {
    base_url: String,
    api_key: String,
    agent: ureq::Agent,
}

impl Client {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl LlmClient for Client {
    fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(%url, model = %request.model, messages = request.messages.len(), "chat request");

        let resp = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Content-Type", "application/json")
            .send_json(serde_json::to_value(request)?);

        match resp {
            Ok(r) => {
                let body: ChatResponse = r.into_json()?;
                Ok(body)
            }
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(anyhow!("API error {}: {}", code, body))
            }
            Err(e) => Err(anyhow!("Request failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "gpt-test".to_string(),
            messages: vec![json!({"role": "user", "content": "hi"})],
            tools: None,
            tool_choice: Some("auto".to_string()),
            temperature: Some(0.5),
            max_completion_tokens: Some(128),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-test");
        assert_eq!(value["tool_choice"], "auto");
        assert_eq!(value["temperature"], 0.5);
        assert_eq!(value["max_completion_tokens"], 128);
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_response_with_tool_calls() {
        let body = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "list_dir", "arguments": "{\"dir_path\":\"out\"}" }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 3 }
        });
        let resp: ChatResponse = serde_json::from_value(body).unwrap();
        let calls = resp.choices[0].message.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "list_dir");
        assert_eq!(calls[0].call_type, "function");
        assert!(resp.choices[0].message.content.is_none());
        assert_eq!(resp.usage.unwrap().prompt_tokens, 10);
    }

    #[test]
    fn test_tool_call_type_defaults() {
        let call: ToolCall = serde_json::from_value(json!({
            "id": "c",
            "function": { "name": "read_file" }
        }))
        .unwrap();
        assert_eq!(call.call_type, "function");
        assert_eq!(call.function.arguments, "");
    }
}
