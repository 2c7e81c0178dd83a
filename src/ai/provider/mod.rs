//! LLM Provider Abstraction
//!
//! Defines the `LlmProvider` trait for chat completions with function tools.
//! All providers return `ChatCompletion` with token usage metrics.
//!
//! ## Modules
//!
//! - `groq`: Groq's OpenAI-compatible Chat Completions API

mod groq;

pub use groq::GroqProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::types::{InnovateError, Result};

// =============================================================================
// Chat Messages
// =============================================================================

/// Conversation role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One message of a chat conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    /// Text content (absent on assistant turns that only call tools)
    #[serde(default)]
    pub content: Option<String>,
    /// Tool calls requested by the assistant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Id of the call a tool message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    /// Assistant turn that requests tool calls
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Tool output answering `call_id`
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
        }
    }

    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

/// Function call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// JSON-encoded arguments, exactly as the model produced them
    pub arguments: String,
}

/// Function tool advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Provider-independent completion request
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
    /// Model for this request; the provider's default when `None`
    pub model: Option<String>,
}

/// Provider-independent completion result
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    /// Assistant text, if any
    pub content: Option<String>,
    /// Tool calls the model wants executed
    pub tool_calls: Vec<ToolCall>,
    /// Token usage metrics
    pub usage: TokenUsage,
    /// Model that answered
    pub model: String,
}

impl ChatCompletion {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
            usage: TokenUsage::default(),
            model: String::new(),
        }
    }

    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Token usage metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens (prompt)
    pub input_tokens: u32,
    /// Output tokens (response)
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used (input + output)
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    /// Create from OpenAI-style usage response
    pub fn from_openai(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            input_tokens: prompt_tokens,
            output_tokens: completion_tokens,
        }
    }

    pub fn accumulate(&mut self, other: TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// Shared LLM provider type
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// LLM Provider Trait
// =============================================================================

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one chat completion. Tools are offered only when `request.tools`
    /// is non-empty.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Default model, used when a request names none
    fn model(&self) -> &str;
}

/// Create a shared provider from validated configuration
pub fn create_provider(config: &Config) -> Result<SharedProvider> {
    match config.llm.provider.as_str() {
        "groq" | "openai-compatible" => {
            let api_key = config.api_key()?;
            Ok(Arc::new(GroqProvider::new(&config.llm, api_key)?))
        }
        other => Err(InnovateError::Config(format!(
            "Unknown provider: {}. Supported: groq, openai-compatible",
            other
        ))),
    }
}
