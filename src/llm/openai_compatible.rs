use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::AgentError;
use crate::llm::provider::{
    ChatProvider, ChatResponse, ContentPart, Message, MessageContent, MessageRole,
};
use crate::tools::definition::{ToolCall, ToolDefinition};

// Zhipu's OpenAI-compatible endpoint; the prototype targets GLM-4.5V.
const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";

#[derive(Clone)]
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(cfg: &LlmConfig) -> Result<Self, AgentError> {
        let base_url = normalize_base_url(cfg.base_url.clone());
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", cfg.api_key))
                .map_err(|e| AgentError::Upstream(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| AgentError::Upstream(e.to_string()))?;

        Ok(Self {
            client,
            model: cfg.model_id.clone(),
            base_url,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleProvider {
    fn provider_name(&self) -> &'static str {
        "openai_compatible"
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn chat_with_tools(
        &self,
        messages: Vec<Message>,
        tools: &[ToolDefinition],
        temperature: f64,
        max_tokens: u32,
    ) -> Result<ChatResponse, AgentError> {
        let tool_defs = tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters
                    }
                })
            })
            .collect::<Vec<_>>();

        let wire_messages = messages
            .into_iter()
            .map(to_wire_message)
            .collect::<Result<Vec<_>, AgentError>>()?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": wire_messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
            "tools": tool_defs,
            "tool_choice": "auto"
        });

        debug!(model = %self.model, "dispatching chat completion");
        let resp = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Upstream(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_else(|_| "".to_string());
            return Err(AgentError::Upstream(format!(
                "chat completion error: {status} {text}"
            )));
        }

        let parsed: WireChatResponse = resp
            .json()
            .await
            .map_err(|e| AgentError::Upstream(e.to_string()))?;

        let choice = parsed
            .choices
            .first()
            .ok_or_else(|| AgentError::Upstream("no choices in response".to_string()))?;

        let content = choice.message.content.clone().unwrap_or_default();
        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(|tc| {
                // Arguments arrive as a JSON-encoded string; keep the raw
                // string when it fails to parse so the executor can report it.
                let args = serde_json::from_str(&tc.function.arguments)
                    .unwrap_or_else(|_| serde_json::Value::String(tc.function.arguments));
                ToolCall {
                    id: tc.id,
                    name: tc.function.name,
                    arguments: args,
                }
            })
            .collect();

        Ok(ChatResponse {
            content,
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
            finish_reason: choice.finish_reason.clone(),
            tool_calls,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireChatResponse {
    pub choices: Vec<WireChoice>,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    pub message: WireMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Clone, Deserialize)]
struct WireToolCall {
    pub id: String,
    #[allow(dead_code)]
    #[serde(rename = "type")]
    pub r#type: String,
    pub function: WireFunctionCall,
}

#[derive(Debug, Clone, Deserialize)]
struct WireFunctionCall {
    pub name: String,
    pub arguments: String,
}

fn to_wire_message(msg: Message) -> Result<serde_json::Value, AgentError> {
    let role = match msg.role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::Tool => "tool",
    };

    let content = match msg.content {
        MessageContent::Text(s) => serde_json::Value::String(s),
        MessageContent::Parts(parts) => serde_json::Value::Array(
            parts
                .into_iter()
                .map(|p| match p {
                    ContentPart::Text { text } => {
                        serde_json::json!({ "type": "text", "text": text })
                    }
                    ContentPart::Image { data } => {
                        serde_json::json!({ "type": "image_url", "image_url": { "url": data } })
                    }
                })
                .collect(),
        ),
    };

    let mut out = serde_json::Map::new();
    out.insert(
        "role".to_string(),
        serde_json::Value::String(role.to_string()),
    );
    out.insert("content".to_string(), content);

    if let Some(tool_call_id) = msg.tool_call_id {
        out.insert(
            "tool_call_id".to_string(),
            serde_json::Value::String(tool_call_id),
        );
    }

    if let Some(tool_calls) = msg.tool_calls {
        let mapped = tool_calls
            .into_iter()
            .map(|tc| {
                let args = serde_json::to_string(&tc.arguments)
                    .map_err(|e| AgentError::Upstream(e.to_string()))?;
                Ok(serde_json::json!({
                    "id": tc.id,
                    "type": "function",
                    "function": { "name": tc.name, "arguments": args }
                }))
            })
            .collect::<Result<Vec<_>, AgentError>>()?;
        out.insert("tool_calls".to_string(), serde_json::Value::Array(mapped));
    }

    Ok(serde_json::Value::Object(out))
}

pub fn normalize_base_url(base_url: Option<String>) -> String {
    let Some(mut base) = base_url else {
        return DEFAULT_BASE_URL.to_string();
    };
    base = base.trim().to_string();
    if base.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }

    // Users sometimes paste the full endpoint.
    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        base = trimmed
            .strip_suffix("/chat/completions")
            .unwrap_or(trimmed)
            .to_string();
    }

    // Only append /v1 when no path was provided.
    match url::Url::parse(&base) {
        Ok(parsed) => {
            let path = parsed.path();
            if path.is_empty() || path == "/" {
                return format!("{}/v1", base.trim_end_matches('/'));
            }
            base.trim_end_matches('/').to_string()
        }
        Err(_) => base.trim_end_matches('/').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_defaults_when_unset() {
        assert_eq!(normalize_base_url(None), DEFAULT_BASE_URL);
        assert_eq!(normalize_base_url(Some("  ".to_string())), DEFAULT_BASE_URL);
    }

    #[test]
    fn normalize_strips_pasted_endpoint() {
        assert_eq!(
            normalize_base_url(Some(
                "https://open.bigmodel.cn/api/paas/v4/chat/completions".to_string()
            )),
            "https://open.bigmodel.cn/api/paas/v4"
        );
    }

    #[test]
    fn normalize_appends_v1_for_bare_host() {
        assert_eq!(
            normalize_base_url(Some("https://api.example.com".to_string())),
            "https://api.example.com/v1"
        );
    }

    #[test]
    fn wire_message_serializes_parts() {
        let msg = Message {
            role: MessageRole::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: "这是什么猫粮".to_string(),
                },
                ContentPart::Image {
                    data: "aGVsbG8=".to_string(),
                },
            ]),
            tool_call_id: None,
            tool_calls: None,
        };

        let wire = to_wire_message(msg).unwrap();
        assert_eq!(wire["role"], "user");
        assert_eq!(wire["content"][0]["type"], "text");
        assert_eq!(wire["content"][1]["image_url"]["url"], "aGVsbG8=");
    }

    #[test]
    fn wire_message_carries_tool_call_id() {
        let msg = Message::tool("call_1", r#"{"ok":true}"#);
        let wire = to_wire_message(msg).unwrap();
        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["tool_call_id"], "call_1");
    }
}
