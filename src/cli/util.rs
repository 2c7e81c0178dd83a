//! CLI Common Utilities
//!
//! Configuration loading shared by the command handlers.

use std::path::PathBuf;

use crate::config::{Config, ConfigLoader, GatePolicy};
use crate::pipeline::ArtifactStore;
use crate::types::Result;

/// Command-line values that take precedence over every config layer
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub output_dir: Option<PathBuf>,
    pub model: Option<String>,
    pub gate: Option<GatePolicy>,
    pub bind: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.pipeline.output_dir = dir.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(gate) = self.gate {
            config.pipeline.gate = gate;
        }
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
    }
}

/// Command execution context
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Effective configuration, validated
    pub config: Config,
}

impl CommandContext {
    /// Load layered configuration, apply overrides, validate
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = ConfigLoader::load()?;
        overrides.apply(&mut config);
        config.validate()?;
        Ok(Self { config })
    }

    pub fn store(&self) -> ArtifactStore {
        ArtifactStore::new(&self.config.pipeline.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let mut config = Config::default();
        let overrides = ConfigOverrides {
            output_dir: Some(PathBuf::from("out")),
            model: Some("llama-3.1-8b-instant".to_string()),
            gate: Some(GatePolicy::ErrorSubstring),
            bind: None,
        };
        overrides.apply(&mut config);

        assert_eq!(config.pipeline.output_dir, PathBuf::from("out"));
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.pipeline.gate, GatePolicy::ErrorSubstring);
        assert_eq!(config.server.bind, Config::default().server.bind);
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let mut config = Config::default();
        ConfigOverrides::default().apply(&mut config);
        assert_eq!(config.llm.model, Config::default().llm.model);
    }
}
