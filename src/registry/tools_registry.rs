//! Tools registry: standalone tools declared in a `tools:` manifest.
//!
//! Unlike the agents registry, a missing tools manifest is not an error by
//! default; the registry simply loads nothing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::state::{RegistryCache, RegistryState};
use crate::manifest::entry::{ManifestDocument, ManifestEntry, ManifestKind};
use crate::manifest::parser::{ManifestParser, MissingManifest};
use crate::resolver::Resolver;
use crate::tools::base_tool::Tool;
use crate::utilities::errors::{ConfigurationError, RegistryError, Result};

/// Registry for loading tools from a YAML manifest.
pub struct ToolsRegistry {
    parser: ManifestParser,
    resolver: Arc<dyn Resolver>,
    cache: RegistryCache<Tool>,
}

impl std::fmt::Debug for ToolsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolsRegistry")
            .field("parser", &self.parser)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl ToolsRegistry {
    pub fn new(manifest_path: impl Into<PathBuf>, resolver: Arc<dyn Resolver>) -> Self {
        let parser = ManifestParser::new(manifest_path, ManifestKind::Tools);
        log::info!("Initialized ToolsRegistry with config: {}", parser.path().display());
        Self {
            parser,
            resolver,
            cache: RegistryCache::new(),
        }
    }

    pub fn with_missing_policy(mut self, missing: MissingManifest) -> Self {
        self.parser = self.parser.with_missing_policy(missing);
        self
    }

    pub fn manifest_path(&self) -> &Path {
        self.parser.path()
    }

    pub fn state(&self) -> RegistryState {
        self.cache.state()
    }

    pub fn cached(&self) -> Option<Arc<Vec<Tool>>> {
        self.cache.items()
    }

    /// Load and return the enabled tools in configured order.
    ///
    /// The first entry that fails to resolve aborts the load with
    /// [`RegistryError::ToolLoad`].
    pub fn load(&self, force_reload: bool) -> Result<Arc<Vec<Tool>>> {
        self.cache.load_with(
            force_reload,
            || {
                log::info!("Loading tools from registry");
                self.parser.parse()
            },
            |document| self.load_document(document),
        )
    }

    pub fn reload(&self) -> Result<Arc<Vec<Tool>>> {
        log::info!("Reloading tools registry");
        self.cache.reload_with(
            || self.parser.parse(),
            |document| self.load_document(document),
        )
    }

    pub fn entry_config(
        &self,
        name: &str,
    ) -> std::result::Result<Option<ManifestEntry>, ConfigurationError> {
        let document = self.cache.document_or_parse(|| self.parser.parse())?;
        Ok(document.find(name).cloned())
    }

    /// Names of the loaded tools, as the resolved tools report them.
    pub fn loaded_names(&self) -> Vec<String> {
        self.cache
            .items()
            .map(|tools| tools.iter().map(|t| t.name().to_string()).collect())
            .unwrap_or_default()
    }

    fn load_document(&self, document: &ManifestDocument) -> Result<Vec<Tool>> {
        let enabled = document.enabled_in_order();
        log::info!(
            "Found {} enabled tools out of {} total",
            enabled.len(),
            document.entries.len()
        );

        let mut loaded = Vec::with_capacity(enabled.len());
        for entry in enabled {
            let Some((name, locator, function)) = entry.tool_parts() else {
                log::warn!("Skipping incomplete tool configuration: {:?}", entry);
                continue;
            };

            let tool = self
                .resolver
                .resolve_tool(locator, function)
                .map_err(|source| {
                    log::error!("Failed to load tool '{}' from '{}': {}", name, locator, source);
                    RegistryError::ToolLoad {
                        tool: name.to_string(),
                        locator: locator.to_string(),
                        function: function.to_string(),
                        source,
                    }
                })?;
            log::info!("Loaded tool: {} ({}.{})", name, locator, function);
            loaded.push(tool);
        }

        Ok(loaded)
    }
}
