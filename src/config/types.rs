//! Configuration Types
//!
//! All configuration structures with sensible defaults.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{llm, network, pipeline, search};
use crate::types::{InnovateError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Web search tool settings
    pub search: SearchConfig,

    /// Stage orchestration settings
    pub pipeline: PipelineConfig,

    /// Interactive UI settings
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            search: SearchConfig::default(),
            pipeline: PipelineConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `InnovateError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(InnovateError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(InnovateError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.model.trim().is_empty() {
            return Err(InnovateError::Config("LLM model must not be empty".to_string()));
        }

        if self.llm.max_tokens == 0 {
            return Err(InnovateError::Config(
                "LLM max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.search.max_results == 0 {
            return Err(InnovateError::Config(
                "Search max_results must be greater than 0".to_string(),
            ));
        }

        if self.search.timeout_secs == 0 {
            return Err(InnovateError::Config(
                "Search timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.default_company.trim().is_empty() {
            return Err(InnovateError::Config(
                "Pipeline default_company must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the model API credential.
    ///
    /// Order: `llm.api_key`, the variable named by `llm.api_key_env`, then the
    /// legacy `Groq_API_Key` spelling. Absence is a configuration error.
    pub fn api_key(&self) -> Result<SecretString> {
        let key = self
            .llm
            .api_key
            .clone()
            .or_else(|| std::env::var(&self.llm.api_key_env).ok())
            .or_else(|| std::env::var(llm::LEGACY_API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                InnovateError::Config(format!(
                    "API key not found. Set {} (or llm.api_key in config)",
                    self.llm.api_key_env
                ))
            })?;

        Ok(SecretString::from(key))
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// OpenAI-compatible API base URL
    pub api_base: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Temperature for LLM generation
    pub temperature: f32,

    /// Maximum tokens to generate per completion
    pub max_tokens: usize,

    /// Model/tool round trips before a final answer is forced
    pub max_tool_rounds: u8,

    /// Environment variable holding the credential
    pub api_key_env: String,

    /// Inline credential. Never serialized to output
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .field("api_key_env", &self.api_key_env)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: llm::DEFAULT_PROVIDER.to_string(),
            model: llm::DEFAULT_MODEL.to_string(),
            api_base: llm::DEFAULT_API_BASE.to_string(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.0,
            max_tokens: llm::DEFAULT_MAX_TOKENS,
            max_tool_rounds: llm::DEFAULT_MAX_TOOL_ROUNDS,
            api_key_env: llm::API_KEY_ENV.to_string(),
            api_key: None,
        }
    }
}

// =============================================================================
// Search Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Expose the search tool to agents
    pub enabled: bool,

    /// DuckDuckGo Instant Answer endpoint
    pub endpoint: String,

    /// Results returned per query
    pub max_results: usize,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: search::DEFAULT_ENDPOINT.to_string(),
            max_results: search::DEFAULT_MAX_RESULTS,
            timeout_secs: network::SEARCH_TIMEOUT_SECS,
        }
    }
}

// =============================================================================
// Pipeline Configuration
// =============================================================================

/// Decides whether a stage result admits the next stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GatePolicy {
    /// Stop only after a stage whose agent call failed
    #[default]
    Tagged,
    /// Stop whenever the result text contains the literal "Error"
    ErrorSubstring,
}

impl std::fmt::Display for GatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatePolicy::Tagged => write!(f, "tagged"),
            GatePolicy::ErrorSubstring => write!(f, "error-substring"),
        }
    }
}

impl std::str::FromStr for GatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tagged" => Ok(GatePolicy::Tagged),
            "error-substring" | "error_substring" | "substring" => Ok(GatePolicy::ErrorSubstring),
            _ => Err(format!(
                "Unknown gate policy: {}. Valid values: tagged, error-substring",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Company analyzed when none is given
    pub default_company: String,

    /// Directory receiving the three markdown artifacts
    pub output_dir: PathBuf,

    /// Gate between stages
    pub gate: GatePolicy,

    /// Prefix agent answers with the tool calls they made
    pub show_tool_calls: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_company: pipeline::DEFAULT_COMPANY.to_string(),
            output_dir: PathBuf::from("."),
            gate: GatePolicy::Tagged,
            show_tool_calls: true,
        }
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address for `serve`
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: network::DEFAULT_BIND.to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
