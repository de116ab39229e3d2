//! Agent loader: resolves one manifest entry into a live agent.
//!
//! The loader:
//! 1. Opens the entry's namespace through the [`Resolver`]
//! 2. Resolves the entry's enabled tools, in order
//! 3. Recursively loads the entry's enabled sub-agents, in order
//! 4. Discovers the agent instance inside the namespace
//! 5. Rebuilds it with the resolved tools and sub-agents, if there are any

use std::sync::Arc;

use super::discovery::{discover_agent, LoaderOptions};
use crate::agent::core::ResolvedComponent;
use crate::manifest::entry::{enabled_in_order, ManifestEntry};
use crate::resolver::Resolver;
use crate::tools::base_tool::Tool;
use crate::utilities::errors::{LoadFailure, RegistryError, Result};

/// Loads agents, their tools and their sub-agents.
#[derive(Clone)]
pub struct AgentLoader {
    resolver: Arc<dyn Resolver>,
    options: LoaderOptions,
}

impl std::fmt::Debug for AgentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentLoader")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl AgentLoader {
    /// Create a loader with default discovery options.
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            resolver,
            options: LoaderOptions::default(),
        }
    }

    /// Builder method to set discovery options.
    pub fn with_options(mut self, options: LoaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub fn resolver(&self) -> &Arc<dyn Resolver> {
        &self.resolver
    }

    /// Load the agent `agent_name` from `locator`, attaching `tools` and
    /// `sub_agents` (manifest entries; disabled ones are ignored).
    pub fn load(
        &self,
        locator: &str,
        agent_name: &str,
        tools: &[ManifestEntry],
        sub_agents: &[ManifestEntry],
    ) -> Result<ResolvedComponent> {
        self.load_tree(locator, agent_name, None, tools, sub_agents, &mut Vec::new())
    }

    /// Load a manifest entry. Returns `Ok(None)` when the entry lacks a name
    /// or module and was skipped.
    pub fn load_entry(&self, entry: &ManifestEntry) -> Result<Option<ResolvedComponent>> {
        self.load_entry_within(entry, &mut Vec::new())
    }

    fn load_entry_within(
        &self,
        entry: &ManifestEntry,
        ancestors: &mut Vec<(String, String)>,
    ) -> Result<Option<ResolvedComponent>> {
        let Some((name, locator)) = entry.agent_parts() else {
            log::warn!("Skipping incomplete agent configuration: {:?}", entry);
            return Ok(None);
        };
        self.load_tree(
            locator,
            name,
            entry.symbol(),
            &entry.tools,
            &entry.sub_agents,
            ancestors,
        )
        .map(Some)
    }

    fn load_tree(
        &self,
        locator: &str,
        agent_name: &str,
        symbol: Option<&str>,
        tools: &[ManifestEntry],
        sub_agents: &[ManifestEntry],
        ancestors: &mut Vec<(String, String)>,
    ) -> Result<ResolvedComponent> {
        if ancestors
            .iter()
            .any(|(l, n)| l == locator && n == agent_name)
        {
            let mut path: Vec<String> = ancestors.iter().map(|(_, n)| n.clone()).collect();
            path.push(agent_name.to_string());
            return Err(RegistryError::CyclicConfiguration { path });
        }

        log::info!("Loading agent '{}' from module: {}", agent_name, locator);

        let namespace = self.resolver.open_namespace(locator).map_err(|source| {
            if source.is_namespace_not_found() {
                RegistryError::ComponentNotFound {
                    component: agent_name.to_string(),
                    locator: locator.to_string(),
                    source,
                }
            } else {
                load_error(agent_name, locator, LoadFailure::Resolve(source))
            }
        })?;
        log::debug!("Successfully opened namespace: {}", locator);

        let loaded_tools = self
            .load_tools(agent_name, tools)
            .map_err(|reason| load_error(agent_name, locator, reason))?;

        ancestors.push((locator.to_string(), agent_name.to_string()));
        let loaded_children = self.load_sub_agents(sub_agents, ancestors);
        ancestors.pop();
        let loaded_children =
            loaded_children.map_err(|reason| load_error(agent_name, locator, reason))?;

        let discovered = discover_agent(&namespace, agent_name, symbol, &self.options)
            .map_err(|reason| load_error(agent_name, locator, reason))?;

        if loaded_tools.is_empty() && loaded_children.is_empty() {
            log::info!("Successfully loaded agent '{}'", agent_name);
            return Ok(discovered);
        }

        log::info!(
            "Loaded agent '{}' from module '{}' with {} tool(s) and {} sub-agent(s)",
            agent_name,
            locator,
            loaded_tools.len(),
            loaded_children.len()
        );
        Ok(Arc::new(
            discovered.with_capabilities(loaded_tools, loaded_children),
        ))
    }

    /// Resolve the enabled tool entries of `agent_name`, in order.
    ///
    /// Entries missing a name, module or function are skipped with a warning.
    pub fn load_tools(
        &self,
        agent_name: &str,
        tools: &[ManifestEntry],
    ) -> std::result::Result<Vec<Tool>, LoadFailure> {
        let mut loaded = Vec::new();
        for entry in enabled_in_order(tools) {
            let Some((tool_name, locator, function)) = entry.tool_parts() else {
                log::warn!(
                    "Skipping incomplete tool configuration for agent '{}': {:?}",
                    agent_name,
                    entry
                );
                continue;
            };

            let tool = self
                .resolver
                .resolve_tool(locator, function)
                .map_err(|source| LoadFailure::Tool {
                    tool: tool_name.to_string(),
                    source,
                })?;
            log::info!(
                "Loaded tool '{}' ({}) from '{}' for agent '{}'",
                tool_name,
                function,
                locator,
                agent_name
            );
            loaded.push(tool);
        }
        Ok(loaded)
    }

    fn load_sub_agents(
        &self,
        sub_agents: &[ManifestEntry],
        ancestors: &mut Vec<(String, String)>,
    ) -> std::result::Result<Vec<ResolvedComponent>, LoadFailure> {
        let mut loaded = Vec::new();
        for entry in enabled_in_order(sub_agents) {
            match self.load_entry_within(entry, ancestors) {
                Ok(Some(agent)) => loaded.push(agent),
                Ok(None) => {}
                Err(err) => {
                    return Err(LoadFailure::SubAgent {
                        name: entry.display_name().to_string(),
                        source: Box::new(err),
                    })
                }
            }
        }
        Ok(loaded)
    }
}

fn load_error(agent_name: &str, locator: &str, reason: LoadFailure) -> RegistryError {
    RegistryError::ComponentLoad {
        component: agent_name.to_string(),
        locator: locator.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::core::Agent;
    use crate::resolver::{Namespace, StaticResolver};
    use crate::utilities::errors::ResolveError;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tool(name: &str) -> Tool {
        Tool::from_fn(name, |_| Ok(Value::Null))
    }

    fn resolver() -> StaticResolver {
        StaticResolver::new()
            .with_namespace(
                Namespace::new("agents.wikipedia").with_agent(
                    "wikipedia_agent",
                    Agent::new("wikipedia_agent")
                        .with_model("test/model")
                        .with_description("Searches Wikipedia")
                        .with_instruction("Search first")
                        .with_tools(vec![tool("builtin")]),
                ),
            )
            .with_namespace(
                Namespace::new("agents.summarizing")
                    .with_agent("summarizing_agent", Agent::new("summarizing_agent")),
            )
            .with_namespace(
                Namespace::new("agents.french")
                    .with_agent("french_translator_agent", Agent::new("french_translator_agent")),
            )
            .with_namespace(Namespace::new("agents.empty").with_value("VERSION", json!(1)))
            .with_namespace(
                Namespace::new("tools.wiki")
                    .with_tool("search_wikipedia", tool("search_wikipedia"))
                    .with_tool("fetch_page", tool("fetch_page"))
                    .with_value("NOT_A_TOOL", json!(true)),
            )
    }

    fn loader() -> AgentLoader {
        AgentLoader::new(Arc::new(resolver()))
    }

    #[test]
    fn test_load_without_attachments_returns_discovered_instance() {
        let r = Arc::new(resolver());
        let original = r
            .open_namespace("agents.wikipedia")
            .unwrap()
            .get("wikipedia_agent")
            .and_then(|s| s.as_agent().cloned())
            .unwrap();

        let loaded = AgentLoader::new(r)
            .load("agents.wikipedia", "wikipedia_agent", &[], &[])
            .unwrap();
        assert!(Arc::ptr_eq(&loaded, &original));
        assert_eq!(loaded.tool_names(), vec!["builtin"]);
    }

    #[test]
    fn test_disabled_attachments_leave_instance_unchanged() {
        let r = Arc::new(resolver());
        let original = r
            .open_namespace("agents.wikipedia")
            .unwrap()
            .get("wikipedia_agent")
            .and_then(|s| s.as_agent().cloned())
            .unwrap();
        let search = ManifestEntry::tool("search", "tools.wiki", "search_wikipedia");
        let tools = vec![search.with_enabled(false)];

        let loaded = AgentLoader::new(r)
            .load("agents.wikipedia", "wikipedia_agent", &tools, &[])
            .unwrap();
        assert!(Arc::ptr_eq(&loaded, &original));
    }

    #[test]
    fn test_tools_attached_in_order_replacing_originals() {
        let tools = vec![
            ManifestEntry::tool("fetch", "tools.wiki", "fetch_page").with_order(2),
            ManifestEntry::tool("search", "tools.wiki", "search_wikipedia").with_order(1),
        ];
        let loaded = loader()
            .load("agents.wikipedia", "wikipedia_agent", &tools, &[])
            .unwrap();
        assert_eq!(loaded.tool_names(), vec!["search_wikipedia", "fetch_page"]);
        assert_eq!(loaded.model(), "test/model");
        assert_eq!(loaded.description(), "Searches Wikipedia");
        assert_eq!(loaded.instruction(), "Search first");
    }

    #[test]
    fn test_tool_missing_function_is_skipped() {
        let mut incomplete = ManifestEntry::tool("broken", "tools.wiki", "unused");
        incomplete.function = None;
        let tools = vec![
            incomplete,
            ManifestEntry::tool("search", "tools.wiki", "search_wikipedia"),
        ];
        let loaded = loader()
            .load("agents.wikipedia", "wikipedia_agent", &tools, &[])
            .unwrap();
        assert_eq!(loaded.tool_names(), vec!["search_wikipedia"]);
    }

    #[test]
    fn test_tool_resolution_failures_are_load_errors() {
        let cases = vec![
            ManifestEntry::tool("gone", "tools.gone", "x"),
            ManifestEntry::tool("absent", "tools.wiki", "absent"),
            ManifestEntry::tool("data", "tools.wiki", "NOT_A_TOOL"),
        ];
        for entry in cases {
            let err = loader()
                .load("agents.wikipedia", "wikipedia_agent", &[entry.clone()], &[])
                .unwrap_err();
            match err {
                RegistryError::ComponentLoad {
                    reason: LoadFailure::Tool { tool, .. },
                    ..
                } => assert_eq!(Some(tool.as_str()), entry.name()),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_namespace_not_found_vs_symbol_missing() {
        let missing = loader().load("agents.nowhere", "ghost", &[], &[]).unwrap_err();
        assert!(matches!(missing, RegistryError::ComponentNotFound { .. }));

        let empty = loader().load("agents.empty", "ghost", &[], &[]).unwrap_err();
        assert!(matches!(
            empty,
            RegistryError::ComponentLoad {
                reason: LoadFailure::NoInstance,
                ..
            }
        ));
    }

    #[test]
    fn test_namespace_init_failure_is_load_error() {
        let r = StaticResolver::new();
        r.register_lazy("agents.remote", || Err("model credentials unavailable".into()));
        let err = AgentLoader::new(Arc::new(r))
            .load("agents.remote", "remote_agent", &[], &[])
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::ComponentLoad {
                reason: LoadFailure::Resolve(ResolveError::NamespaceInit { .. }),
                ..
            }
        ));
    }

    #[test]
    fn test_recursive_sub_agents() {
        let subs = vec![ManifestEntry::agent("summarizing_agent", "agents.summarizing")
            .with_order(1)
            .with_sub_agents(vec![ManifestEntry::agent(
                "french_translator_agent",
                "agents.french",
            )])];
        let root = loader()
            .load("agents.wikipedia", "wikipedia_agent", &[], &subs)
            .unwrap();

        assert_eq!(root.sub_agent_names(), vec!["summarizing_agent"]);
        // sub-agents replace the original tools as well
        assert!(root.tools().is_empty());
        let summarizer = &root.sub_agents()[0];
        assert_eq!(summarizer.sub_agent_names(), vec!["french_translator_agent"]);
    }

    #[test]
    fn test_sub_agent_failure_is_wrapped() {
        let subs = vec![ManifestEntry::agent("ghost", "agents.nowhere")];
        let err = loader()
            .load("agents.wikipedia", "wikipedia_agent", &[], &subs)
            .unwrap_err();
        match &err {
            RegistryError::ComponentLoad {
                component,
                reason: LoadFailure::SubAgent { name, .. },
                ..
            } => {
                assert_eq!(component, "wikipedia_agent");
                assert_eq!(name, "ghost");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            err.root_cause(),
            RegistryError::ComponentNotFound { .. }
        ));
    }

    #[test]
    fn test_incomplete_sub_agent_is_skipped() {
        let mut nameless = ManifestEntry::agent("x", "agents.french");
        nameless.name = None;
        let subs = vec![
            nameless,
            ManifestEntry::agent("french_translator_agent", "agents.french"),
        ];
        let root = loader()
            .load("agents.summarizing", "summarizing_agent", &[], &subs)
            .unwrap();
        assert_eq!(root.sub_agent_names(), vec!["french_translator_agent"]);
    }

    #[test]
    fn test_cycle_detected() {
        let french = ManifestEntry::agent("french_translator_agent", "agents.french")
            .with_sub_agents(vec![ManifestEntry::agent(
                "summarizing_agent",
                "agents.summarizing",
            )]);
        let cyclic = ManifestEntry::agent("summarizing_agent", "agents.summarizing")
            .with_sub_agents(vec![french]);
        let err = loader().load_entry(&cyclic).unwrap_err();
        match err.root_cause() {
            RegistryError::CyclicConfiguration { path } => assert_eq!(
                path,
                &vec![
                    "summarizing_agent".to_string(),
                    "french_translator_agent".to_string(),
                    "summarizing_agent".to_string()
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_siblings_may_share_a_module() {
        let subs = vec![
            ManifestEntry::agent("french_translator_agent", "agents.french").with_order(1),
            ManifestEntry::agent("french_copy", "agents.french").with_order(2),
        ];
        let root = loader()
            .load("agents.summarizing", "summarizing_agent", &[], &subs)
            .unwrap();
        assert_eq!(root.sub_agents().len(), 2);
    }

    #[test]
    fn test_tools_resolved_before_sub_agents() {
        // both fail; the tool error is the one reported
        let tools = vec![ManifestEntry::tool("absent", "tools.wiki", "absent")];
        let subs = vec![ManifestEntry::agent("ghost", "agents.nowhere")];
        let err = loader()
            .load("agents.wikipedia", "wikipedia_agent", &tools, &subs)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::ComponentLoad {
                reason: LoadFailure::Tool { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_factory_tools_invoked_once_per_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let r = resolver().with_namespace(Namespace::new("tools.mcp").with_factory(
            "create_mcp_toolset",
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Tool::from_fn("mcp_toolset", |_| Ok(Value::Null)))
            },
        ));
        let tools = vec![ManifestEntry::tool("mcp", "tools.mcp", "create_mcp_toolset")];
        let loaded = AgentLoader::new(Arc::new(r))
            .load("agents.wikipedia", "wikipedia_agent", &tools, &[])
            .unwrap();
        assert_eq!(loaded.tool_names(), vec!["mcp_toolset"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_explicit_symbol_on_entry() {
        let r = resolver().with_namespace(
            Namespace::new("agents.pair")
                .with_agent("alpha_agent", Agent::new("alpha"))
                .with_agent("beta_agent", Agent::new("beta")),
        );
        let mut entry = ManifestEntry::agent("pair", "agents.pair");
        let l = AgentLoader::new(Arc::new(r));
        assert!(l.load_entry(&entry).is_err());

        entry.symbol = Some("beta_agent".into());
        let agent = l.load_entry(&entry).unwrap().unwrap();
        assert_eq!(agent.name(), "beta");
    }
}
