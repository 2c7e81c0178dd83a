//! Stage definitions and the per-stage runner.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::sink::ArtifactStore;
use super::{prompts, sanitizer};
use crate::ai::agent::{AgentRunner, AgentSpec};
use crate::config::Config;
use crate::constants::{artifacts, search};
use crate::types::{CompanyName, ErrorClassifier, InnovateError, Result};

// =============================================================================
// Stage
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Research,
    UseCases,
    Resources,
}

impl Stage {
    /// Execution order
    pub const ALL: [Stage; 3] = [Stage::Research, Stage::UseCases, Stage::Resources];

    pub fn artifact_file(&self) -> &'static str {
        match self {
            Stage::Research => artifacts::RESEARCH_FILE,
            Stage::UseCases => artifacts::USE_CASES_FILE,
            Stage::Resources => artifacts::RESOURCES_FILE,
        }
    }

    /// URL/CLI identifier
    pub fn slug(&self) -> &'static str {
        match self {
            Stage::Research => "research",
            Stage::UseCases => "use-cases",
            Stage::Resources => "resources",
        }
    }

    /// Human label used in progress lines and error documents
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Research => "Research Agent",
            Stage::UseCases => "Use Case Agent",
            Stage::Resources => "Resource Agent",
        }
    }

    pub fn agent_name(&self) -> &'static str {
        match self {
            Stage::Research => "CompanyResearchAgent",
            Stage::UseCases => "UseCaseAgent",
            Stage::Resources => "ResourceAgent",
        }
    }

    /// First line of every placeholder document
    pub fn section_header(&self) -> &'static str {
        match self {
            Stage::Research => "**Overview**",
            Stage::UseCases => "**AI Use Cases**",
            Stage::Resources => "**Resources for AI Use Cases**",
        }
    }

    /// Section title in the UI
    pub fn title(&self) -> &'static str {
        match self {
            Stage::Research => "Company Research",
            Stage::UseCases => "AI Use Cases",
            Stage::Resources => "Resources for AI Implementation",
        }
    }

    /// Heading printed above the stage's result on the console
    pub fn results_heading(&self, company: &CompanyName) -> String {
        match self {
            Stage::Research => format!("Research Results for {}:", company),
            Stage::UseCases => format!("AI Use Cases for {}:", company),
            Stage::Resources => format!("Resources for {}'s AI Use Cases:", company),
        }
    }

    pub fn previous(&self) -> Option<Stage> {
        match self {
            Stage::Research => None,
            Stage::UseCases => Some(Stage::Research),
            Stage::Resources => Some(Stage::UseCases),
        }
    }

    pub fn prompt(&self, company: &CompanyName, previous: &str) -> String {
        prompts::build_prompt(*self, company, previous)
    }

    /// Agent description for this stage under `config`
    pub fn agent_spec(&self, config: &Config) -> AgentSpec {
        let tools = if config.search.enabled {
            vec![search::TOOL_NAME.to_string()]
        } else {
            Vec::new()
        };

        AgentSpec {
            name: self.agent_name().to_string(),
            model: config.llm.model.clone(),
            tools,
            instructions: prompts::instructions(*self),
            markdown: true,
            show_tool_calls: config.pipeline.show_tool_calls,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for Stage {
    type Err = InnovateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "research" | "company-research" | "company_research" => Ok(Stage::Research),
            "use-cases" | "use_cases" | "usecases" => Ok(Stage::UseCases),
            "resources" => Ok(Stage::Resources),
            other => Err(InnovateError::InvalidInput(format!(
                "Unknown stage: {}. Valid values: research, use-cases, resources",
                other
            ))),
        }
    }
}

// =============================================================================
// Stage Outcome
// =============================================================================

/// Why a stage produced a placeholder instead of model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegradeReason {
    /// The model answered with nothing usable
    EmptyOutput,
    /// The agent call failed
    AgentFailed { message: String },
}

/// Markdown produced by one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    Success { text: String },
    Degraded { reason: DegradeReason, text: String },
}

impl StageOutcome {
    pub fn text(&self) -> &str {
        match self {
            StageOutcome::Success { text } | StageOutcome::Degraded { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            StageOutcome::Success { text } | StageOutcome::Degraded { text, .. } => text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StageOutcome::Degraded { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StageOutcome::Degraded {
                reason: DegradeReason::AgentFailed { .. },
                ..
            }
        )
    }
}

// =============================================================================
// Stage Runner
// =============================================================================

/// Run one stage: invoke the agent, sanitize, persist.
///
/// Agent failures become an error document and never escape. Only artifact
/// write failures are returned as `Err`.
pub async fn run_stage(
    runner: &dyn AgentRunner,
    spec: &AgentSpec,
    stage: Stage,
    prompt: &str,
    company: &CompanyName,
    store: &ArtifactStore,
) -> Result<StageOutcome> {
    let outcome = match runner.run(spec, prompt).await {
        Ok(response) => {
            let outcome = sanitizer::sanitize_outcome(&response.text(), company, stage);
            if outcome.is_degraded() {
                warn!(stage = %stage, company = %company, "Agent returned no usable output");
            }
            outcome
        }
        Err(e) => {
            let category = ErrorClassifier::category_of(&e);
            warn!(
                stage = %stage,
                company = %company,
                category = %category,
                "Agent call failed: {}",
                e
            );
            let message = e.to_string();
            StageOutcome::Degraded {
                text: prompts::error_document(stage, company, &message),
                reason: DegradeReason::AgentFailed { message },
            }
        }
    };

    let path = store.write(stage, outcome.text()).await?;
    info!(
        stage = %stage,
        path = %path.display(),
        degraded = outcome.is_degraded(),
        "Stage finished"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::agent::AgentResponse;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct Fixed(std::result::Result<String, String>);

    #[async_trait]
    impl AgentRunner for Fixed {
        async fn run(&self, _spec: &AgentSpec, _prompt: &str) -> Result<AgentResponse> {
            match &self.0 {
                Ok(text) => Ok(AgentResponse::from_content(text.clone())),
                Err(msg) => Err(InnovateError::LlmApi(msg.clone())),
            }
        }
    }

    /// Model finished with tool calls only
    struct NoContent;

    #[async_trait]
    impl AgentRunner for NoContent {
        async fn run(&self, _spec: &AgentSpec, _prompt: &str) -> Result<AgentResponse> {
            Ok(AgentResponse {
                content: None,
                model: "llama".to_string(),
                ..AgentResponse::default()
            })
        }
    }

    fn acme() -> CompanyName {
        CompanyName::parse("Acme Corp").unwrap()
    }

    async fn run(runner: Fixed, stage: Stage, store: &ArtifactStore) -> StageOutcome {
        let spec = stage.agent_spec(&Config::default());
        let prompt = stage.prompt(&acme(), "");
        run_stage(&runner, &spec, stage, &prompt, &acme(), store)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_success_is_sanitized_and_persisted() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());
        let raw = "<function=duckduckgo_search{\"query\":\"Acme\"}</function>\n**Overview**\nAnvils.";

        let outcome = run(Fixed(Ok(raw.to_string())), Stage::Research, &store).await;

        assert_eq!(
            outcome,
            StageOutcome::Success {
                text: "**Overview**\nAnvils.".to_string()
            }
        );
        let saved = std::fs::read_to_string(tmp.path().join("company_research.md")).unwrap();
        assert_eq!(saved, "**Overview**\nAnvils.");
    }

    #[tokio::test]
    async fn test_failure_becomes_error_document() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());

        let outcome = run(Fixed(Err("boom".to_string())), Stage::UseCases, &store).await;

        assert!(outcome.is_failure());
        let text = outcome.text();
        assert!(text.starts_with("**AI Use Cases**\nError in Use Case Agent for Acme Corp:"));
        assert!(text.contains("boom"));

        let saved = std::fs::read_to_string(tmp.path().join("use_cases.md")).unwrap();
        assert_eq!(saved, text);
    }

    #[tokio::test]
    async fn test_empty_answer_degrades_without_failure() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());

        let outcome = run(Fixed(Ok("  \n".to_string())), Stage::Resources, &store).await;

        assert!(outcome.is_degraded());
        assert!(!outcome.is_failure());
        assert!(outcome.text().contains("No resources found for Acme Corp."));
    }

    #[tokio::test]
    async fn test_missing_content_gets_placeholder() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());
        let spec = Stage::Research.agent_spec(&Config::default());

        let outcome = run_stage(&NoContent, &spec, Stage::Research, "prompt", &acme(), &store)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            StageOutcome::Degraded {
                reason: DegradeReason::EmptyOutput,
                text: prompts::empty_document(Stage::Research, &acme()),
            }
        );
        let saved = std::fs::read_to_string(tmp.path().join("company_research.md")).unwrap();
        assert!(!saved.contains("\"content\""));
        assert!(saved.starts_with("**Overview**"));
    }

    #[tokio::test]
    async fn test_write_failure_propagates() {
        let tmp = TempDir::new().unwrap();
        // Output "directory" is a regular file
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let store = ArtifactStore::new(&blocker);

        let spec = Stage::Research.agent_spec(&Config::default());
        let result = run_stage(
            &Fixed(Ok("text".to_string())),
            &spec,
            Stage::Research,
            "prompt",
            &acme(),
            &store,
        )
        .await;
        assert!(matches!(result, Err(InnovateError::Io(_))));
    }

    #[test]
    fn test_stage_metadata() {
        assert_eq!(Stage::UseCases.artifact_file(), "use_cases.md");
        assert_eq!(Stage::Resources.previous(), Some(Stage::UseCases));
        assert_eq!("use_cases".parse::<Stage>().unwrap(), Stage::UseCases);
        assert!("summary".parse::<Stage>().is_err());
        assert_eq!(
            Stage::Resources.results_heading(&acme()),
            "Resources for Acme Corp's AI Use Cases:"
        );
    }

    #[test]
    fn test_agent_spec_follows_config() {
        let mut config = Config::default();
        let spec = Stage::Research.agent_spec(&config);
        assert_eq!(spec.name, "CompanyResearchAgent");
        assert_eq!(spec.tools, vec!["duckduckgo_search".to_string()]);
        assert!(spec.markdown);

        config.search.enabled = false;
        config.pipeline.show_tool_calls = false;
        let spec = Stage::UseCases.agent_spec(&config);
        assert!(spec.tools.is_empty());
        assert!(!spec.show_tool_calls);
    }
}
