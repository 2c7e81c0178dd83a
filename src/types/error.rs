//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! LLM failures carry a category so degraded stages can be logged with a
//! meaningful cause.
//!
//! ## Error Categories
//!
//! - **RateLimit**: API rate limiting or quota exhaustion
//! - **TokenLimit**: Context too large
//! - **Auth**: Missing or rejected credential
//! - **Network**: Connectivity issues
//! - **Unavailable**: Provider unavailable
//!
//! Categories are descriptive only. Nothing in the pipeline retries.

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for LLM and tool failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited or quota exceeded
    RateLimit,
    /// Context/token limit exceeded
    TokenLimit,
    /// Authentication failed
    Auth,
    /// Network/connectivity issues
    Network,
    /// Provider unavailable
    Unavailable,
    /// Invalid request
    BadRequest,
    /// Parsing the provider response failed
    ParseError,
    /// Temporary server issues
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::TokenLimit => write!(f, "TOKEN_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// LLM error with category and provider context
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            provider: Some(provider.into()),
            ..Self::new(category, message)
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps raw provider messages and HTTP statuses onto [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from any provider
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();

        if lower.contains("rate limit")
            || lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("quota exceeded")
        {
            return LlmError::with_provider(ErrorCategory::RateLimit, message, provider);
        }

        if lower.contains("token")
            && (lower.contains("limit") || lower.contains("exceed") || lower.contains("maximum"))
            || lower.contains("context length")
            || lower.contains("too large")
        {
            return LlmError::with_provider(ErrorCategory::TokenLimit, message, provider);
        }

        if lower.contains("auth")
            || lower.contains("401")
            || lower.contains("403")
            || lower.contains("api key")
            || lower.contains("invalid key")
            || lower.contains("unauthorized")
        {
            return LlmError::with_provider(ErrorCategory::Auth, message, provider);
        }

        if lower.contains("network")
            || lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("timeout")
            || lower.contains("timed out")
        {
            return LlmError::with_provider(ErrorCategory::Network, message, provider);
        }

        if lower.contains("503")
            || lower.contains("502")
            || lower.contains("service unavailable")
            || lower.contains("500")
            || lower.contains("internal error")
        {
            return LlmError::with_provider(ErrorCategory::Unavailable, message, provider);
        }

        if lower.contains("400") || lower.contains("bad request") || lower.contains("malformed") {
            return LlmError::with_provider(ErrorCategory::BadRequest, message, provider);
        }

        if lower.contains("parse") || lower.contains("json") || lower.contains("unexpected token")
        {
            return LlmError::with_provider(ErrorCategory::ParseError, message, provider);
        }

        if lower.contains("temporary") || lower.contains("overloaded") {
            return LlmError::with_provider(ErrorCategory::Transient, message, provider);
        }

        LlmError::with_provider(ErrorCategory::Unknown, message, provider)
    }

    /// Classify HTTP status code directly (more accurate than string matching)
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        match status {
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider),
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            400 | 422 => LlmError::with_provider(ErrorCategory::BadRequest, message, provider),
            413 => LlmError::with_provider(ErrorCategory::TokenLimit, message, provider),
            500 | 502 | 503 | 504 => {
                LlmError::with_provider(ErrorCategory::Transient, message, provider)
            }
            404 => LlmError::with_provider(ErrorCategory::Unavailable, message, provider),
            _ => LlmError::with_provider(ErrorCategory::Unknown, message, provider),
        }
    }

    /// Category of any crate error, for logging degraded stages
    pub fn category_of(err: &InnovateError) -> ErrorCategory {
        match err {
            InnovateError::Llm(llm_err) => llm_err.category,
            InnovateError::LlmApi(msg) | InnovateError::Tool(msg) => {
                Self::classify(msg, "").category
            }
            InnovateError::Http(e) if e.is_timeout() || e.is_connect() => ErrorCategory::Network,
            InnovateError::Http(e) => e
                .status()
                .map(|s| Self::classify_http_status(s.as_u16(), "", "").category)
                .unwrap_or(ErrorCategory::Network),
            InnovateError::Json(_) => ErrorCategory::ParseError,
            InnovateError::Config(_) | InnovateError::InvalidInput(_) => ErrorCategory::BadRequest,
            _ => ErrorCategory::Unknown,
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum InnovateError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // -------------------------------------------------------------------------
    // LLM / Tool Errors
    // -------------------------------------------------------------------------
    /// Structured LLM error with category
    #[error("LLM error: {0}")]
    Llm(LlmError),

    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("Tool error: {0}")]
    Tool(String),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl From<LlmError> for InnovateError {
    fn from(err: LlmError) -> Self {
        InnovateError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, InnovateError>;

// =============================================================================
// Tests
// =============================================================================
