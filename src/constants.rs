//! Global Constants
//!
//! Centralized constants for configuration and tuning.

/// Artifact file names (fixed; overwritten every run)
pub mod artifacts {
    pub const RESEARCH_FILE: &str = "company_research.md";
    pub const USE_CASES_FILE: &str = "use_cases.md";
    pub const RESOURCES_FILE: &str = "resources.md";
}

/// Pipeline constants
pub mod pipeline {
    /// Company analyzed when no name is given on the command line
    pub const DEFAULT_COMPANY: &str = "HCL Technologies";

    /// Prefix of tool-call echoes the model sometimes leaves in its answer
    pub const TOOL_ECHO_MARKER: &str = "<function=duckduckgo_search";

    /// Literal checked by the legacy gate
    pub const ERROR_MARKER: &str = "Error";
}

/// LLM provider constants
pub mod llm {
    pub const DEFAULT_PROVIDER: &str = "groq";

    pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

    pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

    /// Environment variable holding the credential
    pub const API_KEY_ENV: &str = "GROQ_API_KEY";

    /// Spelling used by older `.env` files
    pub const LEGACY_API_KEY_ENV: &str = "Groq_API_Key";

    pub const DEFAULT_MAX_TOKENS: usize = 4096;

    /// Model/tool round trips before a final answer is forced
    pub const DEFAULT_MAX_TOOL_ROUNDS: u8 = 4;
}

/// Web search constants
pub mod search {
    pub const DEFAULT_ENDPOINT: &str = "https://api.duckduckgo.com/";

    pub const DEFAULT_MAX_RESULTS: usize = 5;

    pub const TOOL_NAME: &str = "duckduckgo_search";
}

/// HTTP/Network constants
pub mod network {
    /// Default LLM request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Default search request timeout (seconds)
    pub const SEARCH_TIMEOUT_SECS: u64 = 30;

    pub const DEFAULT_BIND: &str = "127.0.0.1:8501";
}
