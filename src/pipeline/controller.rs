//! Pipeline Controller
//!
//! Runs research, use cases and resources in that order. Each stage's text
//! becomes the next stage's prompt input; the gate decides whether the next
//! stage runs at all. A stage that is not admitted ends the run, and the
//! artifacts of the stages it blocks are removed so none outlive their run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::sink::ArtifactStore;
use super::stage::{Stage, StageOutcome, run_stage};
use crate::ai::agent::{AgentRunner, AgentSpec, ToolAgent};
use crate::ai::provider::create_provider;
use crate::ai::tools::DuckDuckGoSearch;
use crate::config::{Config, GatePolicy};
use crate::constants::pipeline::ERROR_MARKER;
use crate::types::{CompanyName, Result};

// =============================================================================
// Gate
// =============================================================================

impl GatePolicy {
    /// Whether `outcome` may feed the next stage
    pub fn admits(&self, outcome: &StageOutcome) -> bool {
        match self {
            GatePolicy::Tagged => !outcome.is_failure(),
            GatePolicy::ErrorSubstring => !outcome.text().contains(ERROR_MARKER),
        }
    }
}

// =============================================================================
// Events & Report
// =============================================================================

/// Progress notifications for entry points
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Started { company: CompanyName },
    StageStarted { stage: Stage },
    StageFinished { stage: Stage, outcome: StageOutcome },
    /// `stage` did not run because `blocked_by` was not admitted
    StageSkipped { stage: Stage, blocked_by: Stage },
    Finished { artifacts: Vec<PathBuf> },
}

pub type EventObserver = Arc<dyn Fn(&PipelineEvent) + Send + Sync>;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub company: CompanyName,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub research: StageOutcome,
    pub use_cases: Option<StageOutcome>,
    pub resources: Option<StageOutcome>,
}

impl PipelineReport {
    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        match stage {
            Stage::Research => Some(&self.research),
            Stage::UseCases => self.use_cases.as_ref(),
            Stage::Resources => self.resources.as_ref(),
        }
    }

    /// Stages that ran, in order
    pub fn completed(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|s| self.outcome(*s).is_some())
            .collect()
    }
}

// =============================================================================
// Pipeline
// =============================================================================

pub struct Pipeline {
    runner: Arc<dyn AgentRunner>,
    store: ArtifactStore,
    gate: GatePolicy,
    specs: [AgentSpec; 3],
    observer: Option<EventObserver>,
}

impl Pipeline {
    pub fn new(runner: Arc<dyn AgentRunner>, config: &Config) -> Self {
        Self {
            runner,
            store: ArtifactStore::new(&config.pipeline.output_dir),
            gate: config.pipeline.gate,
            specs: Stage::ALL.map(|stage| stage.agent_spec(config)),
            observer: None,
        }
    }

    /// Wire the production agent: configured provider plus web search
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = create_provider(config)?;
        let mut agent = ToolAgent::new(provider, config.llm.max_tool_rounds);
        if config.search.enabled {
            agent = agent.with_tool(Arc::new(DuckDuckGoSearch::new(&config.search)?));
        }
        info!(
            provider = %config.llm.provider,
            model = %config.llm.model,
            tools = ?agent.tool_names(),
            "Pipeline ready"
        );
        Ok(Self::new(Arc::new(agent), config))
    }

    pub fn with_observer(mut self, observer: EventObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    fn spec(&self, stage: Stage) -> &AgentSpec {
        match stage {
            Stage::Research => &self.specs[0],
            Stage::UseCases => &self.specs[1],
            Stage::Resources => &self.specs[2],
        }
    }

    async fn stage(
        &self,
        stage: Stage,
        company: &CompanyName,
        previous: &str,
    ) -> Result<StageOutcome> {
        self.emit(PipelineEvent::StageStarted { stage });
        let prompt = stage.prompt(company, previous);
        let outcome = run_stage(
            self.runner.as_ref(),
            self.spec(stage),
            stage,
            &prompt,
            company,
            &self.store,
        )
        .await?;
        self.emit(PipelineEvent::StageFinished {
            stage,
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    /// Next stage may run after `outcome`. Otherwise every downstream stage
    /// is reported skipped and its artifact removed.
    async fn admit(&self, from: Stage, outcome: &StageOutcome) -> Result<bool> {
        if self.gate.admits(outcome) {
            return Ok(true);
        }
        warn!(stage = %from, gate = %self.gate, "Gate closed, skipping downstream stages");
        let mut blocked_by = from;
        for stage in Stage::ALL.into_iter().skip_while(|s| *s != from).skip(1) {
            if self.store.remove(stage).await? {
                info!(stage = %stage, "Removed artifact from an earlier run");
            }
            self.emit(PipelineEvent::StageSkipped { stage, blocked_by });
            blocked_by = stage;
        }
        Ok(false)
    }

    pub async fn run(&self, company: &CompanyName) -> Result<PipelineReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, company = %company, gate = %self.gate, "Pipeline started");
        self.emit(PipelineEvent::Started {
            company: company.clone(),
        });

        let research = self.stage(Stage::Research, company, "").await?;

        let use_cases = if self.admit(Stage::Research, &research).await? {
            Some(self.stage(Stage::UseCases, company, research.text()).await?)
        } else {
            None
        };

        let mut resources = None;
        if let Some(outcome) = &use_cases
            && self.admit(Stage::UseCases, outcome).await?
        {
            resources = Some(self.stage(Stage::Resources, company, outcome.text()).await?);
        }

        let report = PipelineReport {
            run_id,
            company: company.clone(),
            started_at,
            finished_at: Utc::now(),
            research,
            use_cases,
            resources,
        };

        info!(
            %run_id,
            completed = report.completed().len(),
            elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "Pipeline finished"
        );
        self.emit(PipelineEvent::Finished {
            artifacts: report
                .completed()
                .into_iter()
                .map(|s| self.store.path(s))
                .collect(),
        });

        Ok(report)
    }
}
