//! Three-Stage Analysis Pipeline
//!
//! ```text
//! company ─▶ Research ─▶ gate ─▶ UseCases ─▶ gate ─▶ Resources
//!               │                   │                    │
//!               ▼                   ▼                    ▼
//!     company_research.md      use_cases.md         resources.md
//! ```
//!
//! ## Degradation
//!
//! - Agent call failure: the stage persists an error document and reports
//!   [`DegradeReason::AgentFailed`].
//! - Empty answer: the sanitizer substitutes a placeholder document and the
//!   stage reports [`DegradeReason::EmptyOutput`].
//! - Artifact write failure: returned as an error; the run stops.

mod controller;
mod prompts;
pub mod sanitizer;
mod sink;
mod stage;

pub use controller::{EventObserver, Pipeline, PipelineEvent, PipelineReport};
pub use sanitizer::{sanitize, sanitize_outcome, strip_tool_echoes};
pub use sink::{ArtifactStatus, ArtifactStore};
pub use stage::{DegradeReason, Stage, StageOutcome, run_stage};
