//! Analyze Command
//!
//! Runs the three-stage pipeline for one company and prints each stage's
//! result as it completes.
//!
//! Usage:
//!   innovateeasy [analyze] [COMPANY] [--output-dir DIR] [--model MODEL] [--gate POLICY]

use std::sync::Arc;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, ConfigOverrides};
use crate::pipeline::{Pipeline, PipelineEvent, Stage, StageOutcome};
use crate::types::{CompanyName, Result};

pub struct AnalyzeOptions {
    pub company: Option<String>,
    pub overrides: ConfigOverrides,
    pub quiet: bool,
}

pub async fn run(options: AnalyzeOptions) -> Result<()> {
    let ctx = CommandContext::load(&options.overrides)?;
    let company = CompanyName::parse(
        options
            .company
            .as_deref()
            .unwrap_or(&ctx.config.pipeline.default_company),
    )?;

    let quiet = options.quiet;
    let subject = company.clone();
    let pipeline = Pipeline::from_config(&ctx.config)?.with_observer(Arc::new(
        move |event: &PipelineEvent| report_event(&Output::quiet(quiet), &subject, event),
    ));

    // Stage failures are already reported and persisted; only I/O errors escape
    pipeline.run(&company).await?;
    Ok(())
}

fn report_event(out: &Output, company: &CompanyName, event: &PipelineEvent) {
    match event {
        PipelineEvent::Started { company } => {
            out.header(&format!("Starting Multi-Agent System for {}...", company));
        }
        PipelineEvent::StageStarted { stage } => {
            out.progress(&format!("Running {}...", stage.label()));
        }
        PipelineEvent::StageFinished { stage, outcome } => {
            print_outcome(out, *stage, company, outcome);
        }
        PipelineEvent::StageSkipped { stage, blocked_by } => match stage {
            Stage::Resources => {
                out.error("Error: Cannot run Resource Agent without valid use cases.");
            }
            _ => out.warning(&format!(
                "Skipping {}: {} did not produce a valid result.",
                stage.label(),
                blocked_by.label()
            )),
        },
        PipelineEvent::Finished { artifacts } => {
            let names: Vec<String> = Stage::ALL
                .iter()
                .map(|s| format!("'{}'", s.artifact_file()))
                .collect();
            out.success(&format!(
                "Multi-Agent System completed. Outputs saved to {}, {}, and {}.",
                names[0], names[1], names[2]
            ));
            if let Some(dir) = artifacts.first().and_then(|p| p.parent()) {
                out.info(&format!("Output directory: {}", dir.display()));
            }
        }
    }
}

fn print_outcome(out: &Output, stage: Stage, company: &CompanyName, outcome: &StageOutcome) {
    out.section(&stage.results_heading(company));
    out.document(outcome.text());

    if outcome.is_failure() {
        out.warning(&format!("{} failed.", stage.label()));
    } else if outcome.is_degraded() {
        out.warning(&format!("{} returned no usable output.", stage.label()));
    }
}
