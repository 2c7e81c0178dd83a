//! Agent Tools
//!
//! Functions an agent may ask the model to call. Each tool advertises a JSON
//! Schema for its arguments and returns JSON.

mod duckduckgo;

pub use duckduckgo::{DuckDuckGoSearch, SearchResult};

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::ai::provider::ToolDefinition;
use crate::types::Result;

/// Shared tool handle
pub type SharedTool = Arc<dyn Tool>;

#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call the tool
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema of the arguments object
    fn parameters_schema(&self) -> Value;

    async fn execute(&self, args: Value) -> Result<Value>;

    /// Definition sent to the provider
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}
