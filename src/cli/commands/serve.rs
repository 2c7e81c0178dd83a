//! Serve Command
//!
//! Starts the browser UI.
//!
//! Usage:
//!   innovateeasy serve [--bind ADDR] [--output-dir DIR] [--model MODEL] [--gate POLICY]

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, ConfigOverrides};
use crate::pipeline::Pipeline;
use crate::server::{self, AppState};
use crate::types::Result;

pub async fn run(overrides: ConfigOverrides) -> Result<()> {
    let ctx = CommandContext::load(&overrides)?;
    let pipeline = Pipeline::from_config(&ctx.config)?;
    let state = AppState::new(pipeline, ctx.config.pipeline.default_company.clone());

    let out = Output::new();
    out.info(&format!(
        "InnovateEasy UI on http://{} (artifacts in {})",
        ctx.config.server.bind,
        ctx.config.pipeline.output_dir.display()
    ));

    server::serve(state, &ctx.config.server.bind).await
}
