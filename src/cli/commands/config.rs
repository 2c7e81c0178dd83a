//! Config Command
//!
//! Manage InnovateEasy configuration.
//!
//! Usage:
//!   innovateeasy config show [-f toml|json|yaml]
//!   innovateeasy config path
//!   innovateeasy config init [-g] [--force]

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Print the merged effective configuration. The API key is never shown.
pub fn show(format: &str) -> Result<()> {
    let config = ConfigLoader::load()?;
    println!("{}", ConfigLoader::render(&config, format)?);
    Ok(())
}

pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let out = Output::new();
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };
    out.success(&format!("Configuration ready: {}", path.display()));
    out.info("Set GROQ_API_KEY in the environment or a .env file before running an analysis.");
    Ok(())
}
