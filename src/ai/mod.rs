//! AI Integration Layer
//!
//! Chat-completion providers, agent tools, and the tool-using agent the
//! pipeline stages run on.

pub mod agent;
pub mod provider;
pub mod tools;

pub use agent::{AgentResponse, AgentRunner, AgentSpec, ToolAgent, ToolInvocation};
pub use provider::{
    ChatCompletion, ChatMessage, ChatRequest, GroqProvider, LlmProvider, SharedProvider,
    TokenUsage, ToolCall, ToolDefinition, create_provider,
};
pub use tools::{DuckDuckGoSearch, SearchResult, SharedTool, Tool};
