//! Groq API Provider
//!
//! LLM provider using Groq's OpenAI-compatible Chat Completions API,
//! including function tools. Any OpenAI-compatible endpoint works through
//! `llm.api_base`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{
    ChatCompletion, ChatMessage, ChatRequest, LlmProvider, Role, TokenUsage, ToolCall,
    ToolDefinition,
};
use crate::config::LlmConfig;
use crate::types::{ErrorClassifier, InnovateError, Result};

const PROVIDER_NAME: &str = "groq";

/// Groq provider with secure API key handling
pub struct GroqProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for GroqProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GroqProvider {
    pub fn new(config: &LlmConfig, api_key: SecretString) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InnovateError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    /// Model named by the request, else the configured default
    fn model_for<'a>(&'a self, request: &'a ChatRequest) -> &'a str {
        request
            .model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.model)
    }

    fn build_request(&self, request: &ChatRequest) -> WireRequest {
        let tools: Vec<WireTool> = request.tools.iter().map(WireTool::from).collect();
        let tool_choice = if tools.is_empty() {
            None
        } else {
            Some("auto".to_string())
        };

        WireRequest {
            model: self.model_for(request).to_string(),
            messages: request.messages.iter().map(WireMessage::from).collect(),
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            tools,
            tool_choice,
        }
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let model = self.model_for(request);
        info!(
            "Generating with Groq (model: {}, tools: {})",
            model,
            request.tools.len()
        );

        let start_time = Instant::now();
        let body = self.build_request(request);
        let url = format!("{}/chat/completions", self.api_base);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                InnovateError::Llm(ErrorClassifier::classify(
                    &format!("Groq request failed: {}", e),
                    PROVIDER_NAME,
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InnovateError::Llm(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Groq API error ({}): {}", status, body),
                PROVIDER_NAME,
            )));
        }

        let response_body: WireResponse = response.json().await.map_err(|e| {
            InnovateError::LlmApi(format!("Failed to parse Groq response: {}", e))
        })?;

        debug!(
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Received response from Groq"
        );

        let usage = response_body
            .usage
            .map(|u| TokenUsage::from_openai(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let message = response_body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| InnovateError::LlmApi("No choices in Groq response".to_string()))?;

        Ok(ChatCompletion {
            content: message.content,
            tool_calls: message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|c| ToolCall {
                    id: c.id,
                    name: c.function.name,
                    arguments: c.function.arguments,
                })
                .collect(),
            usage,
            model: response_body.model.unwrap_or_else(|| model.to_string()),
        })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: Role,
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<&ChatMessage> for WireMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
            tool_calls: msg
                .tool_calls
                .iter()
                .map(|c| WireToolCall {
                    id: c.id.clone(),
                    call_type: "function".to_string(),
                    function: WireFunctionCall {
                        name: c.name.clone(),
                        arguments: c.arguments.clone(),
                    },
                })
                .collect(),
            tool_call_id: msg.tool_call_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: WireFunction,
}

impl From<&ToolDefinition> for WireTool {
    fn from(def: &ToolDefinition) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: WireFunction {
                name: def.name.clone(),
                description: def.description.clone(),
                parameters: def.parameters.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: WireFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorCategory;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    fn config_for(api_base: &str) -> LlmConfig {
        LlmConfig {
            api_base: api_base.to_string(),
            timeout_secs: 5,
            ..LlmConfig::default()
        }
    }

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_build_request_with_tools() {
        let provider =
            GroqProvider::new(&LlmConfig::default(), SecretString::from("k".to_string())).unwrap();
        let request = ChatRequest {
            messages: vec![
                ChatMessage::system("be brief"),
                ChatMessage::assistant_tool_calls(
                    None,
                    vec![ToolCall {
                        id: "call_1".to_string(),
                        name: "duckduckgo_search".to_string(),
                        arguments: "{\"query\":\"acme\"}".to_string(),
                    }],
                ),
                ChatMessage::tool_result("call_1", "{}"),
            ],
            tools: vec![ToolDefinition {
                name: "duckduckgo_search".to_string(),
                description: "search".to_string(),
                parameters: json!({"type": "object"}),
            }],
            model: None,
        };

        let wire = serde_json::to_value(provider.build_request(&request)).unwrap();
        assert_eq!(wire["model"], "llama-3.3-70b-versatile");
        assert_eq!(wire["tool_choice"], "auto");
        assert_eq!(wire["tools"][0]["type"], "function");
        assert_eq!(wire["tools"][0]["function"]["name"], "duckduckgo_search");
        assert_eq!(wire["messages"][1]["tool_calls"][0]["type"], "function");
        assert_eq!(
            wire["messages"][1]["tool_calls"][0]["function"]["arguments"],
            "{\"query\":\"acme\"}"
        );
        assert_eq!(wire["messages"][2]["tool_call_id"], "call_1");
    }

    #[test]
    fn test_build_request_without_tools_omits_tool_fields() {
        let provider =
            GroqProvider::new(&LlmConfig::default(), SecretString::from("k".to_string())).unwrap();
        let request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            tools: Vec::new(),
            model: None,
        };

        let wire = serde_json::to_value(provider.build_request(&request)).unwrap();
        assert!(wire.get("tools").is_none());
        assert!(wire.get("tool_choice").is_none());
    }

    #[test]
    fn test_request_model_overrides_default() {
        let provider =
            GroqProvider::new(&LlmConfig::default(), SecretString::from("k".to_string())).unwrap();
        let mut request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            tools: Vec::new(),
            model: Some("llama-3.1-8b-instant".to_string()),
        };

        let wire = serde_json::to_value(provider.build_request(&request)).unwrap();
        assert_eq!(wire["model"], "llama-3.1-8b-instant");

        request.model = Some(String::new());
        let wire = serde_json::to_value(provider.build_request(&request)).unwrap();
        assert_eq!(wire["model"], "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = GroqProvider::new(
            &LlmConfig::default(),
            SecretString::from("gsk-very-secret".to_string()),
        )
        .unwrap();
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("gsk-very-secret"));
    }

    #[tokio::test]
    async fn test_chat_parses_content_and_tool_calls() {
        let router = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["messages"][0]["role"], "user");
                Json(json!({
                    "model": "llama-3.3-70b-versatile",
                    "choices": [{
                        "message": {
                            "role": "assistant",
                            "content": null,
                            "tool_calls": [{
                                "id": "call_9",
                                "type": "function",
                                "function": {
                                    "name": "duckduckgo_search",
                                    "arguments": "{\"query\":\"Acme Corp\"}"
                                }
                            }]
                        }
                    }],
                    "usage": {"prompt_tokens": 12, "completion_tokens": 3}
                }))
            }),
        );
        let base = spawn_stub(router).await;

        let provider =
            GroqProvider::new(&config_for(&base), SecretString::from("k".to_string())).unwrap();
        let completion = provider
            .chat(&ChatRequest {
                messages: vec![ChatMessage::user("Research Acme Corp")],
                tools: Vec::new(),
                model: None,
            })
            .await
            .unwrap();

        assert!(completion.content.is_none());
        assert!(completion.wants_tools());
        assert_eq!(completion.tool_calls[0].id, "call_9");
        assert_eq!(completion.tool_calls[0].name, "duckduckgo_search");
        assert_eq!(completion.usage.total(), 15);
    }

    #[tokio::test]
    async fn test_chat_maps_rate_limit_status() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base = spawn_stub(router).await;

        let provider =
            GroqProvider::new(&config_for(&base), SecretString::from("k".to_string())).unwrap();
        let err = provider
            .chat(&ChatRequest {
                messages: vec![ChatMessage::user("hi")],
                tools: Vec::new(),
                model: None,
            })
            .await
            .unwrap_err();

        match err {
            InnovateError::Llm(llm) => {
                assert_eq!(llm.category, ErrorCategory::RateLimit);
                assert!(llm.message.contains("slow down"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
