//! Tool-Using Agent
//!
//! An agent is a model plus instructions plus tools, invoked with a single
//! prompt. [`AgentRunner`] is the narrow seam the pipeline depends on;
//! [`ToolAgent`] is the production implementation that loops between the
//! provider and its tools until the model answers in text.
//!
//! ```text
//! prompt ─▶ model ─▶ tool calls? ──yes──▶ run tools ─▶ model ─▶ ...
//!                        │
//!                        no ─▶ answer
//! ```

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::ai::provider::{ChatMessage, ChatRequest, SharedProvider, TokenUsage, ToolCall};
use crate::ai::tools::SharedTool;
use crate::types::Result;

// =============================================================================
// Agent Specification & Response
// =============================================================================

/// Everything that distinguishes one agent from another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    /// Agent name (e.g., "CompanyResearchAgent")
    pub name: String,
    /// Model identifier; the provider's default when empty
    pub model: String,
    /// Names of the tools the agent may call
    pub tools: Vec<String>,
    /// Natural-language instruction list
    pub instructions: Vec<String>,
    /// Ask for markdown output
    pub markdown: bool,
    /// Prefix the answer with the tool calls that were made
    pub show_tool_calls: bool,
}

impl AgentSpec {
    /// System message assembled from the instruction list
    pub fn system_prompt(&self) -> String {
        let mut prompt = String::from("## Instructions\n");
        for instruction in &self.instructions {
            prompt.push_str("- ");
            prompt.push_str(instruction);
            prompt.push('\n');
        }
        if self.markdown {
            prompt.push_str("- Use markdown to format your answers.\n");
        }
        prompt
    }
}

/// One executed tool call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: Value,
    pub succeeded: bool,
}

impl ToolInvocation {
    /// ` - Running: duckduckgo_search(query=Acme Corp)`
    fn running_line(&self) -> String {
        let args = match &self.arguments {
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => format!("{}={}", k, s),
                    other => format!("{}={}", k, other),
                })
                .collect::<Vec<_>>()
                .join(", "),
            other => other.to_string(),
        };
        format!(" - Running: {}({})", self.name, args)
    }
}

/// Result of one agent run
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentResponse {
    /// Final text answer; `None` when the model produced no text
    pub content: Option<String>,
    /// Tool calls executed along the way
    pub tool_calls: Vec<ToolInvocation>,
    /// Accumulated token usage
    pub usage: TokenUsage,
    /// Model that answered
    pub model: String,
}

impl AgentResponse {
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Textual payload; empty when the model ended without text
    pub fn text(&self) -> String {
        self.content.clone().unwrap_or_default()
    }
}

// =============================================================================
// Agent Runner Trait
// =============================================================================

/// Runs an agent to completion for one prompt
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(&self, spec: &AgentSpec, prompt: &str) -> Result<AgentResponse>;
}

// =============================================================================
// Tool Agent
// =============================================================================

/// Provider-backed agent with function tools
pub struct ToolAgent {
    provider: SharedProvider,
    tools: HashMap<String, SharedTool>,
    max_tool_rounds: u8,
}

impl ToolAgent {
    pub fn new(provider: SharedProvider, max_tool_rounds: u8) -> Self {
        Self {
            provider,
            tools: HashMap::new(),
            max_tool_rounds,
        }
    }

    pub fn with_tool(mut self, tool: SharedTool) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    async fn call_tool(&self, call: &ToolCall) -> (ToolInvocation, String) {
        let arguments: Value = if call.arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&call.arguments)
                .unwrap_or_else(|_| Value::String(call.arguments.clone()))
        };

        let outcome = match self.tools.get(&call.name) {
            Some(tool) => tool.execute(arguments.clone()).await,
            None => Err(crate::types::InnovateError::Tool(format!(
                "Unknown tool: {}",
                call.name
            ))),
        };

        let (succeeded, output) = match outcome {
            Ok(value) => (true, value.to_string()),
            Err(e) => {
                warn!(tool = %call.name, "Tool call failed: {}", e);
                (false, serde_json::json!({ "error": e.to_string() }).to_string())
            }
        };

        (
            ToolInvocation {
                name: call.name.clone(),
                arguments,
                succeeded,
            },
            output,
        )
    }
}

#[async_trait]
impl AgentRunner for ToolAgent {
    async fn run(&self, spec: &AgentSpec, prompt: &str) -> Result<AgentResponse> {
        let definitions: Vec<_> = spec
            .tools
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect();

        let model = if spec.model.is_empty() {
            self.provider.model().to_string()
        } else {
            spec.model.clone()
        };

        let mut request = ChatRequest {
            messages: vec![
                ChatMessage::system(spec.system_prompt()),
                ChatMessage::user(prompt),
            ],
            tools: definitions,
            model: Some(model.clone()),
        };

        info!(agent = %spec.name, model = %model, "Running agent");

        let mut response = AgentResponse {
            model,
            ..AgentResponse::default()
        };

        let mut round = 0u8;
        let completion = loop {
            // Out of rounds: ask for an answer with tools withdrawn
            if round >= self.max_tool_rounds {
                request.tools.clear();
            }

            let completion = self.provider.chat(&request).await?;
            response.usage.accumulate(completion.usage);
            if !completion.model.is_empty() {
                response.model = completion.model.clone();
            }

            if !completion.wants_tools() || request.tools.is_empty() {
                break completion;
            }

            round += 1;
            debug!(
                agent = %spec.name,
                round,
                calls = completion.tool_calls.len(),
                "Model requested tools"
            );

            request.messages.push(ChatMessage::assistant_tool_calls(
                completion.content.clone(),
                completion.tool_calls.clone(),
            ));
            for call in &completion.tool_calls {
                let (invocation, output) = self.call_tool(call).await;
                request
                    .messages
                    .push(ChatMessage::tool_result(call.id.clone(), output));
                response.tool_calls.push(invocation);
            }
        };

        response.content = match completion.content {
            Some(content) if spec.show_tool_calls && !response.tool_calls.is_empty() => {
                let mut lines: Vec<String> = response
                    .tool_calls
                    .iter()
                    .map(ToolInvocation::running_line)
                    .collect();
                lines.push(String::new());
                lines.push(content);
                Some(lines.join("\n"))
            }
            other => other,
        };

        info!(
            agent = %spec.name,
            tool_calls = response.tool_calls.len(),
            tokens = response.usage.total(),
            "Agent finished"
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{ChatCompletion, LlmProvider};
    use crate::ai::tools::Tool;
    use crate::types::InnovateError;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    /// Replays scripted completions and records every request
    struct ScriptedProvider {
        replies: Mutex<VecDeque<ChatCompletion>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<ChatCompletion>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| InnovateError::LlmApi("script exhausted".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "mock-model"
        }
    }

    struct EchoSearch {
        calls: AtomicU32,
    }

    #[async_trait]
    impl Tool for EchoSearch {
        fn name(&self) -> &str {
            "duckduckgo_search"
        }

        fn description(&self) -> &str {
            "echo"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn execute(&self, args: Value) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"query": args["query"], "results": []}))
        }
    }

    fn spec(show_tool_calls: bool) -> AgentSpec {
        AgentSpec {
            name: "CompanyResearchAgent".to_string(),
            model: "mock-model".to_string(),
            tools: vec!["duckduckgo_search".to_string()],
            instructions: vec!["Research the company.".to_string()],
            markdown: true,
            show_tool_calls,
        }
    }

    fn tool_call(id: &str, query: &str) -> ChatCompletion {
        ChatCompletion {
            content: None,
            tool_calls: vec![ToolCall {
                id: id.to_string(),
                name: "duckduckgo_search".to_string(),
                arguments: json!({ "query": query }).to_string(),
            }],
            usage: TokenUsage::from_openai(10, 2),
            model: String::new(),
        }
    }

    #[test]
    fn test_system_prompt_lists_instructions() {
        let prompt = spec(false).system_prompt();
        assert!(prompt.contains("- Research the company."));
        assert!(prompt.contains("markdown"));
    }

    #[test]
    fn test_response_without_content_has_empty_text() {
        let response = AgentResponse {
            content: None,
            model: "mock-model".to_string(),
            ..AgentResponse::default()
        };
        assert_eq!(response.text(), "");

        assert_eq!(AgentResponse::from_content("hi").text(), "hi");
    }

    #[tokio::test]
    async fn test_plain_answer_without_tools() {
        let provider = Arc::new(ScriptedProvider::new(vec![ChatCompletion::text(
            "**Overview**\nAcme makes anvils.",
        )]));
        let agent = ToolAgent::new(provider.clone(), 3);

        let response = agent.run(&spec(true), "Research Acme").await.unwrap();
        assert_eq!(response.text(), "**Overview**\nAcme makes anvils.");
        assert!(response.tool_calls.is_empty());

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        // Tool not registered with the agent, so nothing is advertised
        assert!(requests[0].tools.is_empty());
    }

    #[tokio::test]
    async fn test_tool_loop_feeds_results_back() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call("call_1", "Acme Corp"),
            ChatCompletion::text("**Overview**\nAcme makes anvils."),
        ]));
        let search = Arc::new(EchoSearch {
            calls: AtomicU32::new(0),
        });
        let agent = ToolAgent::new(provider.clone(), 3).with_tool(search.clone());

        let response = agent.run(&spec(true), "Research Acme").await.unwrap();

        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.usage.total(), 12);

        let text = response.text();
        assert!(text.starts_with(" - Running: duckduckgo_search(query=Acme Corp)"));
        assert!(text.ends_with("Acme makes anvils."));

        let requests = provider.requests.lock().unwrap();
        let last = requests.last().unwrap();
        let tool_msg = last.messages.last().unwrap();
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn test_tool_rounds_are_bounded() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call("call_1", "a"),
            tool_call("call_2", "b"),
            ChatCompletion::text("final"),
        ]));
        let search = Arc::new(EchoSearch {
            calls: AtomicU32::new(0),
        });
        let agent = ToolAgent::new(provider.clone(), 1).with_tool(search.clone());

        let response = agent.run(&spec(false), "Research").await.unwrap();

        // Second request is sent without tools, so its tool call is ignored
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.content.as_deref(), None);
        assert_eq!(response.text(), "");

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].tools.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool_reported_to_model() {
        let mut call = tool_call("call_1", "x");
        call.tool_calls[0].name = "browse".to_string();
        let provider = Arc::new(ScriptedProvider::new(vec![
            call,
            ChatCompletion::text("done"),
        ]));
        let search = Arc::new(EchoSearch {
            calls: AtomicU32::new(0),
        });
        let agent = ToolAgent::new(provider.clone(), 3).with_tool(search);

        let response = agent.run(&spec(false), "Research").await.unwrap();
        assert_eq!(response.content.as_deref(), Some("done"));
        assert!(!response.tool_calls[0].succeeded);

        let requests = provider.requests.lock().unwrap();
        let output = requests[1].messages.last().unwrap().content.clone().unwrap();
        assert!(output.contains("Unknown tool: browse"));
    }

    #[tokio::test]
    async fn test_spec_model_is_requested() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            ChatCompletion::text("a"),
            ChatCompletion::text("b"),
        ]));
        let agent = ToolAgent::new(provider.clone(), 3);

        let mut spec = spec(false);
        spec.model = "llama-3.1-8b-instant".to_string();
        let response = agent.run(&spec, "Research").await.unwrap();
        assert_eq!(response.model, "llama-3.1-8b-instant");

        spec.model = String::new();
        agent.run(&spec, "Research").await.unwrap();

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[0].model.as_deref(), Some("llama-3.1-8b-instant"));
        assert_eq!(requests[1].model.as_deref(), Some("mock-model"));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        let agent = ToolAgent::new(provider, 3);
        assert!(agent.run(&spec(false), "Research").await.is_err());
    }
}
