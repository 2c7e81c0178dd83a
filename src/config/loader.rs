//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/innovateeasy/config.toml)
//! 3. Project config (./innovateeasy.toml)
//! 4. Environment variables (INNOVATEEASY_* prefix, `__` separates sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{InnovateError, Result};

const ENV_PREFIX: &str = "INNOVATEEASY_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_from(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Load configuration from explicit global/project paths.
    /// Missing files are skipped.
    pub fn load_from(global: Option<&Path>, project: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // INNOVATEEASY_LLM__MODEL -> llm.model
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| InnovateError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/innovateeasy/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("innovateeasy"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from("innovateeasy.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());

        let dotenv = Path::new(".env");
        let exists = if dotenv.exists() { "✓" } else { "✗" };
        println!("  Dotenv:  {} {}", exists, dotenv.display());
    }

    /// Render the effective configuration in the requested format
    pub fn render(config: &Config, format: &str) -> Result<String> {
        match format {
            "json" => Ok(serde_json::to_string_pretty(config)?),
            "yaml" => {
                serde_yaml::to_string(config).map_err(|e| InnovateError::Config(e.to_string()))
            }
            "toml" | "text" => {
                toml::to_string_pretty(config).map_err(|e| InnovateError::Config(e.to_string()))
            }
            other => Err(InnovateError::Config(format!(
                "Unknown format: {}. Valid values: toml, json, yaml",
                other
            ))),
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a commented project config (`innovateeasy.toml`)
    pub fn init_project(force: bool) -> Result<PathBuf> {
        let config_path = Self::project_config_path();
        Self::write_default(&config_path, force)?;
        Ok(config_path)
    }

    /// Write a commented global config
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            InnovateError::Config("Cannot determine global config directory".to_string())
        })?;
        fs::create_dir_all(&global_dir)?;

        let config_path = global_dir.join("config.toml");
        Self::write_default(&config_path, force)?;
        Ok(config_path)
    }

    fn write_default(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
            return Ok(());
        }
        fs::write(path, Self::default_config())?;
        info!("Created config: {}", path.display());
        Ok(())
    }

    /// Default config content (TOML)
    fn default_config() -> String {
        r#"# InnovateEasy Configuration
# The API key is read from GROQ_API_KEY (or a .env file); do not commit it here.

version = "1.0"

[llm]
provider = "groq"
model = "llama-3.3-70b-versatile"
api_base = "https://api.groq.com/openai/v1"
timeout_secs = 300
temperature = 0.0
max_tokens = 4096
max_tool_rounds = 4
api_key_env = "GROQ_API_KEY"

[search]
enabled = true
endpoint = "https://api.duckduckgo.com/"
max_results = 5

[pipeline]
default_company = "HCL Technologies"
output_dir = "."
# "tagged" stops after a failed agent call; "error-substring" stops whenever
# a result contains the word "Error".
gate = "tagged"
show_tool_calls = true

[server]
bind = "127.0.0.1:8501"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatePolicy;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_without_files() {
        let temp_dir = TempDir::new().unwrap();
        let config =
            ConfigLoader::load_from(None, &temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.version, "1.0");
    }

    #[test]
    fn test_project_file_overrides_global() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let project = temp_dir.path().join("project.toml");

        fs::write(
            &global,
            "[llm]\nmodel = \"global-model\"\n[pipeline]\ndefault_company = \"Globex\"\n",
        )
        .unwrap();
        fs::write(&project, "[llm]\nmodel = \"project-model\"\n").unwrap();

        let config = ConfigLoader::load_from(Some(&global), &project).unwrap();
        assert_eq!(config.llm.model, "project-model");
        assert_eq!(config.pipeline.default_company, "Globex");
    }

    #[test]
    fn test_gate_parsed_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("innovateeasy.toml");
        fs::write(&project, "[pipeline]\ngate = \"error-substring\"\n").unwrap();

        let config = ConfigLoader::load_from(None, &project).unwrap();
        assert_eq!(config.pipeline.gate, GatePolicy::ErrorSubstring);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("innovateeasy.toml");
        fs::write(&project, "[llm]\ntemperature = 5.0\n").unwrap();

        let err = ConfigLoader::load_from(None, &project).unwrap_err();
        assert!(matches!(err, InnovateError::Config(_)));
    }

    #[test]
    fn test_default_config_round_trips() {
        let config: Config = toml::from_str(&ConfigLoader::default_config()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind, "127.0.0.1:8501");
    }

    #[test]
    fn test_render_formats() {
        let config = Config::default();
        assert!(
            ConfigLoader::render(&config, "json")
                .unwrap()
                .contains("\"model\"")
        );
        assert!(ConfigLoader::render(&config, "yaml").unwrap().contains("model:"));
        assert!(ConfigLoader::render(&config, "toml").unwrap().contains("[llm]"));
        assert!(ConfigLoader::render(&config, "xml").is_err());
    }
}
