//! Finding the agent instance inside an opened namespace.
//!
//! Precedence:
//! 1. the symbol named exactly like the requested agent, if it is an agent;
//! 2. the single public symbol whose name ends with the component suffix;
//! 3. among several suffix matches, the one whose symbol name or agent name
//!    equals the requested name, otherwise an ambiguity error;
//! 4. with no suffix matches, the first public agent in the namespace.
//!
//! An explicit `symbol:` on the entry, or [`LoaderOptions::strict`], limits
//! discovery to a single exact lookup.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agent::core::Agent;
use crate::resolver::Namespace;
use crate::utilities::errors::{LoadFailure, ResolveError};

/// Knobs for agent discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Naming suffix marking a symbol as an agent candidate.
    pub component_suffix: String,
    /// Only accept an exact symbol match; never scan the namespace.
    pub strict: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            component_suffix: "_agent".to_string(),
            strict: false,
        }
    }
}

/// Locate the agent for `agent_name` in `namespace`.
pub fn discover_agent(
    namespace: &Namespace,
    agent_name: &str,
    explicit_symbol: Option<&str>,
    options: &LoaderOptions,
) -> Result<Arc<Agent>, LoadFailure> {
    if let Some(symbol) = explicit_symbol {
        return exact(namespace, symbol);
    }

    if let Some(agent) = namespace.get(agent_name).and_then(|s| s.as_agent()) {
        log::debug!("Found agent '{}' by exact name in {}", agent_name, namespace.locator());
        return Ok(Arc::clone(agent));
    }

    if options.strict {
        return exact(namespace, agent_name);
    }

    let candidates: Vec<(&str, &Arc<Agent>)> = namespace
        .public_symbols()
        .filter(|(name, _)| name.ends_with(options.component_suffix.as_str()))
        .filter_map(|(name, symbol)| symbol.as_agent().map(|agent| (name, agent)))
        .collect();

    match candidates.as_slice() {
        [(name, agent)] => {
            log::debug!(
                "Using single '{}' candidate '{}' in {} for '{}'",
                options.component_suffix,
                name,
                namespace.locator(),
                agent_name
            );
            Ok(Arc::clone(agent))
        }
        [] => namespace
            .public_symbols()
            .find_map(|(_, symbol)| symbol.as_agent())
            .map(|agent| {
                log::debug!(
                    "Falling back to agent '{}' found by scanning {}",
                    agent.name(),
                    namespace.locator()
                );
                Arc::clone(agent)
            })
            .ok_or(LoadFailure::NoInstance),
        many => many
            .iter()
            .find(|(name, agent)| *name == agent_name || agent.name() == agent_name)
            .map(|(_, agent)| Arc::clone(agent))
            .ok_or_else(|| LoadFailure::Ambiguous {
                candidates: many.iter().map(|(name, _)| name.to_string()).collect(),
            }),
    }
}

fn exact(namespace: &Namespace, symbol: &str) -> Result<Arc<Agent>, LoadFailure> {
    match namespace.get(symbol) {
        Some(found) => found.as_agent().cloned().ok_or(LoadFailure::NoInstance),
        None => Err(LoadFailure::Resolve(ResolveError::SymbolNotFound {
            locator: namespace.locator().to_string(),
            symbol: symbol.to_string(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::base_tool::Tool;
    use serde_json::{json, Value};

    fn opts() -> LoaderOptions {
        LoaderOptions::default()
    }

    #[test]
    fn test_exact_name_wins() {
        let ns = Namespace::new("m")
            .with_agent("wiki", Agent::new("exact"))
            .with_agent("other_agent", Agent::new("suffix"));
        let agent = discover_agent(&ns, "wiki", None, &opts()).unwrap();
        assert_eq!(agent.name(), "exact");
    }

    #[test]
    fn test_exact_name_ignored_when_not_an_agent() {
        let ns = Namespace::new("m")
            .with_value("wiki", json!("config"))
            .with_agent("wikipedia_agent", Agent::new("wikipedia"));
        let agent = discover_agent(&ns, "wiki", None, &opts()).unwrap();
        assert_eq!(agent.name(), "wikipedia");
    }

    #[test]
    fn test_single_suffix_candidate_used_despite_name_mismatch() {
        let ns = Namespace::new("m")
            .with_agent("summarizing_agent", Agent::new("summarizer"))
            .with_tool("summarize", Tool::from_fn("summarize", |_| Ok(Value::Null)));
        let agent = discover_agent(&ns, "completely_different", None, &opts()).unwrap();
        assert_eq!(agent.name(), "summarizer");
    }

    #[test]
    fn test_private_suffix_symbols_are_skipped() {
        let ns = Namespace::new("m")
            .with_agent("_draft_agent", Agent::new("draft"))
            .with_agent("final_agent", Agent::new("final"));
        let agent = discover_agent(&ns, "x", None, &opts()).unwrap();
        assert_eq!(agent.name(), "final");
    }

    #[test]
    fn test_multiple_candidates_disambiguated_by_symbol_name() {
        let ns = Namespace::new("m")
            .with_agent("alpha_agent", Agent::new("a"))
            .with_agent("beta_agent", Agent::new("b"));
        let agent = discover_agent(&ns, "beta_agent", None, &opts()).unwrap();
        assert_eq!(agent.name(), "b");
    }

    #[test]
    fn test_multiple_candidates_disambiguated_by_embedded_name() {
        let ns = Namespace::new("m")
            .with_agent("alpha_agent", Agent::new("french_translator"))
            .with_agent("beta_agent", Agent::new("summarizer"));
        let agent = discover_agent(&ns, "summarizer", None, &opts()).unwrap();
        assert_eq!(agent.name(), "summarizer");
    }

    #[test]
    fn test_multiple_candidates_without_match_is_ambiguous() {
        let ns = Namespace::new("m")
            .with_agent("alpha_agent", Agent::new("a"))
            .with_agent("beta_agent", Agent::new("b"));
        match discover_agent(&ns, "gamma", None, &opts()) {
            Err(LoadFailure::Ambiguous { candidates }) => {
                assert_eq!(candidates, vec!["alpha_agent", "beta_agent"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_full_scan_fallback() {
        let ns = Namespace::new("m")
            .with_value("VERSION", json!(2))
            .with_agent("root", Agent::new("root"));
        let agent = discover_agent(&ns, "x", None, &opts()).unwrap();
        assert_eq!(agent.name(), "root");
    }

    #[test]
    fn test_no_agent_at_all() {
        let ns = Namespace::new("m")
            .with_agent("_hidden", Agent::new("hidden"))
            .with_value("VERSION", json!(2));
        assert!(matches!(
            discover_agent(&ns, "x", None, &opts()),
            Err(LoadFailure::NoInstance)
        ));
    }

    #[test]
    fn test_suffix_is_configurable() {
        let ns = Namespace::new("m")
            .with_agent("wiki_component", Agent::new("wiki"))
            .with_agent("helper_agent", Agent::new("helper"))
            .with_agent("other_agent", Agent::new("other"));
        let options = LoaderOptions {
            component_suffix: "_component".into(),
            strict: false,
        };
        let agent = discover_agent(&ns, "x", None, &options).unwrap();
        assert_eq!(agent.name(), "wiki");
    }

    #[test]
    fn test_strict_mode_disables_scanning() {
        let ns = Namespace::new("m").with_agent("wikipedia_agent", Agent::new("wikipedia"));
        let strict = LoaderOptions {
            strict: true,
            ..LoaderOptions::default()
        };
        assert!(matches!(
            discover_agent(&ns, "wiki", None, &strict),
            Err(LoadFailure::Resolve(ResolveError::SymbolNotFound { .. }))
        ));
        assert!(discover_agent(&ns, "wikipedia_agent", None, &strict).is_ok());
    }

    #[test]
    fn test_explicit_symbol() {
        let ns = Namespace::new("m")
            .with_agent("alpha_agent", Agent::new("a"))
            .with_agent("beta_agent", Agent::new("b"))
            .with_value("config", json!({}));
        let agent = discover_agent(&ns, "gamma", Some("beta_agent"), &opts()).unwrap();
        assert_eq!(agent.name(), "b");
        assert!(matches!(
            discover_agent(&ns, "gamma", Some("config"), &opts()),
            Err(LoadFailure::NoInstance)
        ));
        assert!(discover_agent(&ns, "gamma", Some("missing"), &opts()).is_err());
    }
}
