//! InnovateEasy - AI Solutions Explorer for Businesses
//!
//! Researches a company, brainstorms AI use cases from that research and
//! collects datasets/tools for those use cases. Each step is one LLM agent
//! call with web search; each result is saved as a markdown file.
//!
//! ## Quick Start
//!
//! ```ignore
//! use innovateeasy::{CompanyName, ConfigLoader, Pipeline};
//!
//! let config = ConfigLoader::load()?;
//! let pipeline = Pipeline::from_config(&config)?;
//! let report = pipeline.run(&CompanyName::parse("HCL Technologies")?).await?;
//! println!("{}", report.research.text());
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: chat provider, tools, tool-using agent
//! - [`pipeline`]: stages, sanitizer, artifact store, controller
//! - [`server`]: browser UI
//! - [`config`]: layered configuration
//! - [`cli`]: command handlers

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod pipeline;
pub mod server;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, GatePolicy};

// Error Types
pub use types::error::{ErrorCategory, InnovateError, Result};
pub use types::CompanyName;

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{
    ArtifactStatus, ArtifactStore, DegradeReason, Pipeline, PipelineEvent, PipelineReport, Stage,
    StageOutcome,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{AgentRunner, AgentSpec, DuckDuckGoSearch, GroqProvider, LlmProvider, ToolAgent};
