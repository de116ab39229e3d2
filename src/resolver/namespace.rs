//! Runtime namespaces and the symbols they export.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::agent::core::Agent;
use crate::tools::base_tool::{Tool, ToolFactory};
use crate::utilities::errors::BoxError;

/// Something a namespace exports.
#[derive(Clone)]
pub enum Symbol {
    /// A ready agent instance.
    Agent(Arc<Agent>),
    /// A tool; callable as-is.
    Tool(Tool),
    /// A zero-argument constructor returning a tool.
    Factory(ToolFactory),
    /// Plain data. Never callable.
    Value(Value),
}

impl Symbol {
    /// Short label used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Symbol::Agent(_) => "agent",
            Symbol::Tool(_) => "tool",
            Symbol::Factory(_) => "factory",
            Symbol::Value(_) => "value",
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Symbol::Tool(_) | Symbol::Factory(_))
    }

    pub fn as_agent(&self) -> Option<&Arc<Agent>> {
        match self {
            Symbol::Agent(agent) => Some(agent),
            _ => None,
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Agent(agent) => f.debug_tuple("Agent").field(&agent.name()).finish(),
            Symbol::Tool(tool) => f.debug_tuple("Tool").field(&tool.name()).finish(),
            Symbol::Factory(_) => f.write_str("Factory(..)"),
            Symbol::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// A named collection of exported symbols.
///
/// Symbols are kept sorted by name so that every scan over a namespace
/// visits them in the same order.
#[derive(Debug, Clone)]
pub struct Namespace {
    locator: String,
    symbols: BTreeMap<String, Symbol>,
}

impl Namespace {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            symbols: BTreeMap::new(),
        }
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Export a symbol, replacing any previous one with that name.
    pub fn insert(&mut self, name: impl Into<String>, symbol: Symbol) {
        self.symbols.insert(name.into(), symbol);
    }

    /// Builder method exporting an agent instance.
    pub fn with_agent(mut self, name: impl Into<String>, agent: Agent) -> Self {
        self.insert(name, Symbol::Agent(Arc::new(agent)));
        self
    }

    /// Builder method exporting an already shared agent instance.
    pub fn with_shared_agent(mut self, name: impl Into<String>, agent: Arc<Agent>) -> Self {
        self.insert(name, Symbol::Agent(agent));
        self
    }

    /// Builder method exporting a tool.
    pub fn with_tool(mut self, name: impl Into<String>, tool: Tool) -> Self {
        self.insert(name, Symbol::Tool(tool));
        self
    }

    /// Builder method exporting a tool factory.
    pub fn with_factory<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Tool, BoxError> + Send + Sync + 'static,
    {
        self.insert(name, Symbol::Factory(Arc::new(factory)));
        self
    }

    /// Builder method exporting plain data.
    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, Symbol::Value(value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// All symbols in name order.
    pub fn symbols(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.symbols.iter().map(|(name, symbol)| (name.as_str(), symbol))
    }

    /// Symbols not starting with `_`, in name order.
    pub fn public_symbols(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.symbols().filter(|(name, _)| !name.starts_with('_'))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_symbols_sorted_and_private_filtered() {
        let ns = Namespace::new("agents.wikipedia")
            .with_agent("wikipedia_agent", Agent::new("wikipedia"))
            .with_value("_internal", json!(1))
            .with_tool("search", Tool::from_fn("search", |_| Ok(Value::Null)))
            .with_value("MAX_RESULTS", json!(5));

        let all: Vec<&str> = ns.symbols().map(|(n, _)| n).collect();
        assert_eq!(all, vec!["MAX_RESULTS", "_internal", "search", "wikipedia_agent"]);

        let public: Vec<&str> = ns.public_symbols().map(|(n, _)| n).collect();
        assert_eq!(public, vec!["MAX_RESULTS", "search", "wikipedia_agent"]);
    }

    #[test]
    fn test_symbol_kinds() {
        let ns = Namespace::new("m")
            .with_agent("a", Agent::new("a"))
            .with_factory("f", || Ok(Tool::from_fn("t", |_| Ok(Value::Null))))
            .with_value("v", json!("x"));

        assert!(ns.get("a").unwrap().as_agent().is_some());
        assert!(!ns.get("a").unwrap().is_callable());
        assert!(ns.get("f").unwrap().is_callable());
        assert_eq!(ns.get("v").unwrap().kind(), "value");
        assert!(ns.get("missing").is_none());
    }
}
