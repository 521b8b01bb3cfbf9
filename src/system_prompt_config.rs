use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Optional override of the built-in Cypher instructions, loaded from a JSON file
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SystemPromptConfig {
    /// Instructions used for every model unless a per-model entry exists
    #[serde(default)]
    pub global: Option<String>,

    /// Model-specific instructions that override the global prompt
    #[serde(default)]
    pub per_model: HashMap<String, String>,

    /// When false the built-in prompt is used regardless of the entries above
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl SystemPromptConfig {
    /// Load system prompt configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read system prompt config file: {}",
                path.as_ref().display()
            )
        })?;

        let config: SystemPromptConfig = serde_json::from_str(&content)
            .with_context(|| "Failed to parse system prompt config JSON")?;

        Ok(config)
    }

    /// Priority: per_model > global
    pub fn get_prompt(&self, model: Option<&str>) -> Option<String> {
        if !self.enabled {
            return None;
        }

        if let Some(m) = model {
            if let Some(prompt) = self.per_model.get(m) {
                return Some(prompt.clone());
            }
        }

        self.global.clone()
    }

    /// No overrides; the built-in prompt applies
    pub fn empty() -> Self {
        Self {
            global: None,
            per_model: HashMap::new(),
            enabled: true,
        }
    }
}
