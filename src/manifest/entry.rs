//! Manifest data types.
//!
//! Example YAML:
//!
//! ```yaml
//! version: "1.0"
//! agents:
//!   - name: wikipedia_agent
//!     module: search_agent.sub_agents.wikipedia.wikipedia_agent
//!     enabled: true
//!     order: 1
//!     tools:
//!       - name: search_wikipedia
//!         module: search_agent.sub_agents.wikipedia.tools
//!         function: search_wikipedia
//!         enabled: true
//!     sub_agents: []
//! ```

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Which top-level list a manifest carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    Agents,
    Tools,
}

impl ManifestKind {
    /// The top-level key holding the entry list.
    pub fn key(self) -> &'static str {
        match self {
            ManifestKind::Agents => "agents",
            ManifestKind::Tools => "tools",
        }
    }
}

impl std::fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for ManifestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "agents" | "agent" => Ok(ManifestKind::Agents),
            "tools" | "tool" => Ok(ManifestKind::Tools),
            other => Err(format!("unknown manifest kind '{}'", other)),
        }
    }
}

/// One declared agent or tool.
///
/// Required fields are kept optional here: an entry missing them is parsed,
/// then skipped with a warning when the registry gets to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(default)]
    pub name: Option<String>,

    /// Namespace path used for resolution.
    #[serde(default, rename = "module", alias = "locator")]
    pub locator: Option<String>,

    /// Symbol to resolve inside the namespace (tools only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    /// Explicit symbol for an agent. When set, discovery only looks at this symbol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ManifestEntry>,

    #[serde(default, alias = "sub_components", skip_serializing_if = "Vec::is_empty")]
    pub sub_agents: Vec<ManifestEntry>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl ManifestEntry {
    /// Shorthand for an enabled agent entry.
    pub fn agent(name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            locator: Some(locator.into()),
            enabled: true,
            ..Self::default()
        }
    }

    /// Shorthand for an enabled tool entry.
    pub fn tool(
        name: impl Into<String>,
        locator: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            locator: Some(locator.into()),
            function: Some(function.into()),
            enabled: true,
            ..Self::default()
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ManifestEntry>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_sub_agents(mut self, sub_agents: Vec<ManifestEntry>) -> Self {
        self.sub_agents = sub_agents;
        self
    }

    /// Name, if present and non-empty.
    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    /// Locator, if present and non-empty.
    pub fn locator(&self) -> Option<&str> {
        non_empty(&self.locator)
    }

    /// Function, if present and non-empty.
    pub fn function(&self) -> Option<&str> {
        non_empty(&self.function)
    }

    /// Explicit agent symbol, if present and non-empty.
    pub fn symbol(&self) -> Option<&str> {
        non_empty(&self.symbol)
    }

    /// Name used in messages for entries that may lack one.
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or("unknown")
    }

    /// `(name, locator)` when both are present.
    pub fn agent_parts(&self) -> Option<(&str, &str)> {
        Some((self.name()?, self.locator()?))
    }

    /// `(name, locator, function)` when all three are present.
    pub fn tool_parts(&self) -> Option<(&str, &str, &str)> {
        Some((self.name()?, self.locator()?, self.function()?))
    }
}

/// Enabled entries sorted by `order`.
///
/// Entries without an order sort after every entry that has one. The sort is
/// stable, so ties keep declaration order.
pub fn enabled_in_order(entries: &[ManifestEntry]) -> Vec<&ManifestEntry> {
    let mut enabled: Vec<&ManifestEntry> = entries.iter().filter(|e| e.enabled).collect();
    enabled.sort_by_key(|e| (e.order.is_none(), e.order.unwrap_or(0)));
    enabled
}

/// A parsed manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip)]
    pub kind: ManifestKind,
    pub entries: Vec<ManifestEntry>,
}

impl ManifestDocument {
    /// The "nothing configured" document.
    pub fn empty(kind: ManifestKind) -> Self {
        Self {
            version: None,
            kind,
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Enabled top-level entries in load order.
    pub fn enabled_in_order(&self) -> Vec<&ManifestEntry> {
        enabled_in_order(&self.entries)
    }

    /// First top-level entry with the given name, enabled or not.
    pub fn find(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.name() == Some(name))
    }

    /// Render the enabled entries, in load order, as an indented tree.
    ///
    /// ```text
    /// agents (2 of 3 enabled)
    /// - [1] wikipedia_agent (search_agent.sub_agents.wikipedia)
    ///     tool [1] search_wikipedia (tools.wiki:search)
    /// - [-] summarizing_agent (search_agent.sub_agents.summarizing)
    /// ```
    pub fn render_plan(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} ({} of {} enabled)",
            self.kind,
            self.enabled_in_order().len(),
            self.entries.len()
        );
        for entry in self.enabled_in_order() {
            render_entry(&mut out, entry, 0, self.kind == ManifestKind::Tools);
        }
        out
    }
}

fn order_label(entry: &ManifestEntry) -> String {
    entry
        .order
        .map(|o| o.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn render_entry(out: &mut String, entry: &ManifestEntry, depth: usize, as_tool: bool) {
    let indent = "    ".repeat(depth);
    let locator = entry.locator().unwrap_or("?");
    if as_tool {
        let _ = writeln!(
            out,
            "{}tool [{}] {} ({}:{})",
            indent,
            order_label(entry),
            entry.display_name(),
            locator,
            entry.function().unwrap_or("?")
        );
        return;
    }
    let _ = writeln!(
        out,
        "{}- [{}] {} ({})",
        indent,
        order_label(entry),
        entry.display_name(),
        locator
    );
    for tool in enabled_in_order(&entry.tools) {
        render_entry(out, tool, depth + 1, true);
    }
    for child in enabled_in_order(&entry.sub_agents) {
        render_entry(out, child, depth + 1, false);
    }
}
