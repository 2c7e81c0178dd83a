pub mod error;

pub use error::{ErrorCategory, ErrorClassifier, InnovateError, LlmError, Result};

// =============================================================================
// Domain Newtypes
// =============================================================================

use std::fmt;

/// Type-safe wrapper for the analysis subject
///
/// Opaque to the pipeline; only non-emptiness is checked. Surrounding
/// whitespace is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct CompanyName(String);

impl CompanyName {
    pub fn parse(name: impl AsRef<str>) -> Result<Self> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InnovateError::InvalidInput(
                "Please enter a company name.".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CompanyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for CompanyName {
    type Err = InnovateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
