use crate::error::OrchestratorError;
use anyhow::{Context, Result};
use pagesmith_lifecycle::ProjectLayout;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

pub const CONFIG_ENV: &str = "PAGESMITH_CONFIG";
pub const CONFIG_FILE_NAME: &str = "pagesmith.toml";

/// Engine knobs: cache size and the bounded retry budgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub search_cache_capacity: usize,
    /// Rounds in which failed instructions are sent back for correction.
    pub max_correction_rounds: usize,
    /// Follow-up calls made to finish a truncated completion.
    pub continuation_attempts: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            search_cache_capacity: 256,
            max_correction_rounds: 1,
            continuation_attempts: 1,
        }
    }
}

/// OpenAI-compatible chat-completions endpoint. Without `base_url` the engine runs
/// offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaboratorSettings {
    pub base_url: Option<String>,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for CollaboratorSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 4096,
            timeout_secs: 60,
        }
    }
}

impl CollaboratorSettings {
    pub fn is_configured(&self) -> bool {
        self.base_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub project: ProjectLayout,
    pub engine: EngineSettings,
    pub collaborator: CollaboratorSettings,
}

impl EngineConfig {
    /// Load from `explicit`, else `$PAGESMITH_CONFIG`, else `./pagesmith.toml`, else
    /// defaults. A relative project root is taken relative to the config file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(|| {
                let local = PathBuf::from(CONFIG_FILE_NAME);
                local.is_file().then_some(local)
            });

        let Some(path) = path else {
            log::debug!("no {CONFIG_FILE_NAME} found, using defaults");
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config = Self::from_toml_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;

        if config.project.root.is_relative() {
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                config.project.root = dir.join(&config.project.root);
            }
        }
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("Invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), OrchestratorError> {
        let invalid = |msg: String| Err(OrchestratorError::InvalidConfig(msg));

        if self.project.extension.trim().trim_start_matches('.').is_empty() {
            return invalid("project.extension must not be empty".to_string());
        }
        if self.engine.search_cache_capacity == 0 {
            return invalid("engine.search_cache_capacity must be at least 1".to_string());
        }
        for (key, path) in [
            ("project.components_dir", &self.project.components_dir),
            ("project.manifest", &self.project.manifest),
        ] {
            if escapes_root(&self.project.root, path) {
                return invalid(format!(
                    "{key} must stay inside the project root ({})",
                    path.display()
                ));
            }
        }
        Ok(())
    }
}

fn escapes_root(root: &Path, path: &Path) -> bool {
    if path.is_absolute() {
        return !path.starts_with(root);
    }
    path.components()
        .any(|component| matches!(component, Component::ParentDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [project]
            components_dir = "app/sections"

            [engine]
            max_correction_rounds = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.project.components_dir, PathBuf::from("app/sections"));
        assert_eq!(config.project.extension, "astro");
        assert_eq!(config.engine.max_correction_rounds, 2);
        assert_eq!(config.engine.continuation_attempts, 1);
        assert!(!config.collaborator.is_configured());
    }

    #[test]
    fn rejects_zero_cache_and_empty_extension() {
        assert!(EngineConfig::from_toml_str("[engine]\nsearch_cache_capacity = 0\n").is_err());
        assert!(EngineConfig::from_toml_str("[project]\nextension = \"\"\n").is_err());
    }

    #[test]
    fn rejects_component_dir_outside_root() {
        assert!(
            EngineConfig::from_toml_str("[project]\ncomponents_dir = \"../elsewhere\"\n").is_err()
        );
        assert!(
            EngineConfig::from_toml_str("[project]\nroot = \"/srv/site\"\nmanifest = \"/etc/page.astro\"\n")
                .is_err()
        );
    }

    #[test]
    fn relative_root_follows_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[project]\nroot = \"site\"\n").unwrap();

        let config = EngineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.project.root, dir.path().join("site"));
    }
}
