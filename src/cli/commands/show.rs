//! Show Command
//!
//! Prints persisted artifacts from the last run.
//!
//! Usage:
//!   innovateeasy show [research|use-cases|resources] [--output-dir DIR]

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, ConfigOverrides};
use crate::pipeline::{ArtifactStatus, Stage};
use crate::types::Result;

pub async fn run(stage: Option<Stage>, overrides: ConfigOverrides) -> Result<()> {
    let ctx = CommandContext::load(&overrides)?;
    let store = ctx.store();
    let out = Output::new();

    let stages = match stage {
        Some(stage) => vec![stage],
        None => Stage::ALL.to_vec(),
    };

    for stage in stages {
        out.section(stage.title());
        let file = stage.artifact_file();
        match store.read(stage).await {
            ArtifactStatus::Ready { content } => out.document(&content),
            ArtifactStatus::Empty => out.warning(&format!("{} is empty.", file)),
            ArtifactStatus::Missing => out.error(&format!(
                "{} not found at {}.",
                file,
                store.path(stage).display()
            )),
            ArtifactStatus::Unreadable { error } => {
                out.error(&format!("Failed to read {}: {}", file, error))
            }
        }
    }

    Ok(())
}
