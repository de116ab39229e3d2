//! Assembles the root agent from its profile and the two registries.

use std::sync::Arc;

use crate::agent::core::{Agent, AgentProfile, ResolvedComponent};
use crate::registry::{AgentsRegistry, ToolsRegistry};
use crate::resolver::Resolver;
use crate::utilities::config::RegistryConfig;
use crate::utilities::errors::Result;

/// Builder for a root agent whose sub-agents and tools come from registries.
///
/// # Example
///
/// ```ignore
/// let agent = AgentBuilder::new("search_agent")
///     .model("openrouter/x-ai/grok-4.1-fast:free")
///     .agents(AgentsRegistry::new("agents_registry.yaml", resolver.clone()))
///     .build()?;
/// ```
#[derive(Debug)]
pub struct AgentBuilder {
    profile: AgentProfile,
    agents: Option<AgentsRegistry>,
    tools: Option<ToolsRegistry>,
}

impl AgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            profile: AgentProfile {
                name: name.into(),
                ..AgentProfile::default()
            },
            agents: None,
            tools: None,
        }
    }

    /// Wire the profile and both registries from configuration.
    ///
    /// A registry is only attached when its manifest path is configured.
    pub fn from_config(config: &RegistryConfig, resolver: Arc<dyn Resolver>) -> Self {
        let agents = config.agents_manifest.as_ref().map(|path| {
            AgentsRegistry::new(path, Arc::clone(&resolver))
                .with_missing_policy(config.agents_missing)
                .with_loader_options(config.discovery.clone())
        });
        let tools = config.tools_manifest.as_ref().map(|path| {
            ToolsRegistry::new(path, Arc::clone(&resolver))
                .with_missing_policy(config.tools_missing)
        });
        Self {
            profile: config.root.profile(),
            agents,
            tools,
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.profile.model = model.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.profile.description = description.into();
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.profile.instruction = instruction.into();
        self
    }

    /// Take sub-agents from this registry.
    pub fn agents(mut self, registry: AgentsRegistry) -> Self {
        self.agents = Some(registry);
        self
    }

    /// Take tools from this registry.
    pub fn tools(mut self, registry: ToolsRegistry) -> Self {
        self.tools = Some(registry);
        self
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn agents_registry(&self) -> Option<&AgentsRegistry> {
        self.agents.as_ref()
    }

    pub fn tools_registry(&self) -> Option<&ToolsRegistry> {
        self.tools.as_ref()
    }

    /// Load both registries and construct the root agent.
    ///
    /// Registries keep their caches, so building twice reuses loaded
    /// components.
    pub fn build(&self) -> Result<ResolvedComponent> {
        let sub_agents = match &self.agents {
            Some(registry) => registry.load(false).inspect_err(|e| {
                log::error!("Failed to build agent '{}': {}", self.profile.name, e);
            })?,
            None => Arc::new(Vec::new()),
        };
        let tools = match &self.tools {
            Some(registry) => registry.load(false).inspect_err(|e| {
                log::error!("Failed to build agent '{}': {}", self.profile.name, e);
            })?,
            None => Arc::new(Vec::new()),
        };

        let agent = Agent::from_profile(self.profile.clone())
            .with_tools((*tools).clone())
            .with_sub_agents((*sub_agents).clone());

        log::info!(
            "Successfully built agent '{}' with {} sub-agent(s) and {} tool(s)",
            agent.name(),
            agent.sub_agents().len(),
            agent.tools().len()
        );
        Ok(Arc::new(agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{Namespace, StaticResolver};
    use crate::tools::base_tool::Tool;
    use crate::utilities::errors::RegistryError;
    use serde_json::json;

    fn resolver() -> Arc<dyn Resolver> {
        Arc::new(
            StaticResolver::new()
                .with_namespace(
                    Namespace::new("agents.wikipedia")
                        .with_agent("wikipedia_agent", Agent::new("wikipedia")),
                )
                .with_namespace(
                    Namespace::new("agents.summarizing")
                        .with_agent("summarizing_agent", Agent::new("summarizer")),
                )
                .with_namespace(
                    Namespace::new("tools.weather").with_tool(
                        "get_weather",
                        Tool::from_fn("get_weather", |_| Ok(json!("sunny"))),
                    ),
                ),
        )
    }

    #[test]
    fn test_build_without_registries() {
        let agent = AgentBuilder::new("solo")
            .model("m")
            .description("d")
            .instruction("i")
            .build()
            .unwrap();
        assert_eq!(agent.name(), "solo");
        assert_eq!(agent.model(), "m");
        assert!(agent.tools().is_empty());
        assert!(agent.sub_agents().is_empty());
    }

    #[test]
    fn test_from_config_wires_registries() {
        let dir = tempfile::tempdir().unwrap();
        let agents_path = dir.path().join("agents.yaml");
        let tools_path = dir.path().join("tools.yaml");
        std::fs::write(
            &agents_path,
            r#"
agents:
  - {name: summarizer, module: agents.summarizing, enabled: true, order: 2}
  - {name: wikipedia, module: agents.wikipedia, enabled: true, order: 1}
"#,
        )
        .unwrap();
        std::fs::write(
            &tools_path,
            r#"
tools:
  - {name: get_weather, module: tools.weather, function: get_weather, enabled: true}
"#,
        )
        .unwrap();

        let config = RegistryConfig {
            agents_manifest: Some(agents_path),
            tools_manifest: Some(tools_path),
            ..RegistryConfig::default()
        };
        let builder = AgentBuilder::from_config(&config, resolver());
        assert_eq!(builder.profile().name, "search_agent");

        let agent = builder.build().unwrap();
        assert_eq!(agent.sub_agent_names(), vec!["wikipedia", "summarizer"]);
        assert_eq!(agent.tool_names(), vec!["get_weather"]);
        assert_eq!(agent.model(), "openrouter/x-ai/grok-4.1-fast:free");
    }

    #[test]
    fn test_missing_tools_manifest_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let config = RegistryConfig {
            tools_manifest: Some(dir.path().join("absent.yaml")),
            ..RegistryConfig::default()
        };
        let agent = AgentBuilder::from_config(&config, resolver()).build().unwrap();
        assert!(agent.tools().is_empty());
        assert!(AgentBuilder::from_config(&config, resolver()).agents_registry().is_none());
    }

    #[test]
    fn test_registry_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let config = RegistryConfig {
            agents_manifest: Some(dir.path().join("absent.yaml")),
            ..RegistryConfig::default()
        };
        let err = AgentBuilder::from_config(&config, resolver()).build().unwrap_err();
        assert!(matches!(err, RegistryError::Configuration(_)));
    }
}
