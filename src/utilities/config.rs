//! Registry configuration.
//!
//! Values come from three places, highest priority first: environment
//! variables, an optional YAML configuration file, built-in defaults.
//! A [`RegistryConfig`] is an ordinary value; nothing here is global.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::agent::core::AgentProfile;
use crate::loader::LoaderOptions;
use crate::manifest::parser::MissingManifest;
use crate::utilities::errors::ConfigurationError;

/// Environment variable overriding [`RegistryConfig::agents_manifest`].
pub const ENV_AGENTS_REGISTRY_PATH: &str = "AGENTS_REGISTRY_PATH";
/// Environment variable overriding [`RegistryConfig::tools_manifest`].
pub const ENV_TOOLS_REGISTRY_PATH: &str = "TOOLS_REGISTRY_PATH";
/// Environment variable overriding the root agent's model.
pub const ENV_MODEL_NAME: &str = "MODEL_NAME";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Top-level configuration for building registries and the root agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Agents manifest; no agents registry is built when unset.
    pub agents_manifest: Option<PathBuf>,
    /// Tools manifest; no tools registry is built when unset.
    pub tools_manifest: Option<PathBuf>,
    pub agents_missing: MissingManifest,
    pub tools_missing: MissingManifest,
    pub discovery: LoaderOptions,
    pub root: RootAgentConfig,
    pub logging: LoggingConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            agents_manifest: None,
            tools_manifest: None,
            agents_missing: MissingManifest::Fatal,
            tools_missing: MissingManifest::Empty,
            discovery: LoaderOptions::default(),
            root: RootAgentConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Identity of the root agent assembled by [`crate::builder::AgentBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootAgentConfig {
    pub name: String,
    pub description: String,
    pub instruction: String,
    pub model: String,
}

impl Default for RootAgentConfig {
    fn default() -> Self {
        Self {
            name: "search_agent".to_string(),
            description: "A helpful assistant for user questions.".to_string(),
            instruction: "Answer user questions to the best of your knowledge".to_string(),
            model: "openrouter/x-ai/grok-4.1-fast:free".to_string(),
        }
    }
}

impl RootAgentConfig {
    pub fn profile(&self) -> AgentProfile {
        AgentProfile {
            name: self.name.clone(),
            model: self.model.clone(),
            description: self.description.clone(),
            instruction: self.instruction.clone(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl RegistryConfig {
    /// Parse a YAML configuration document. An empty document yields defaults.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigurationError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: RegistryConfig = serde_yaml::from_str(content)?;
        config.validated()
    }

    /// Read a configuration file. A missing file yields defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No configuration file at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Configuration file (if given) plus environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigurationError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by variable name. Empty values are ignored.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_AGENTS_REGISTRY_PATH) {
            self.agents_manifest = Some(PathBuf::from(path));
        }
        if let Some(path) = get(ENV_TOOLS_REGISTRY_PATH) {
            self.tools_manifest = Some(PathBuf::from(path));
        }
        if let Some(model) = get(ENV_MODEL_NAME) {
            self.root.model = model;
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        self.validated()
    }

    fn validated(mut self) -> Result<Self, ConfigurationError> {
        let level = self.logging.level.trim().to_ascii_lowercase();
        // `warning` and `critical` are accepted as aliases
        let level = match level.as_str() {
            "warning" => "warn".to_string(),
            "critical" => "error".to_string(),
            _ => level,
        };
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigurationError::InvalidSetting {
                key: "logging.level".to_string(),
                message: format!(
                    "unknown level '{}', expected one of {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        self.logging.level = level;
        Ok(self)
    }
}
