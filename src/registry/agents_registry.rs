//! Agents registry: loads the enabled agents of a manifest, in order, and
//! caches the result until an explicit reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::state::{RegistryCache, RegistryState};
use crate::agent::core::ResolvedComponent;
use crate::loader::{AgentLoader, LoaderOptions};
use crate::manifest::entry::{ManifestDocument, ManifestEntry, ManifestKind};
use crate::manifest::parser::{ManifestParser, MissingManifest};
use crate::resolver::Resolver;
use crate::utilities::errors::{ConfigurationError, RegistryError, Result};

/// Registry for managing and loading agents from a YAML manifest.
///
/// A missing manifest is a configuration error unless the registry is built
/// with [`MissingManifest::Empty`].
#[derive(Debug)]
pub struct AgentsRegistry {
    parser: ManifestParser,
    loader: AgentLoader,
    cache: RegistryCache<ResolvedComponent>,
}

impl AgentsRegistry {
    /// Create a registry for the manifest at `manifest_path`.
    pub fn new(manifest_path: impl Into<PathBuf>, resolver: Arc<dyn Resolver>) -> Self {
        let parser = ManifestParser::new(manifest_path, ManifestKind::Agents);
        log::info!("Initialized AgentsRegistry with config: {}", parser.path().display());
        Self {
            parser,
            loader: AgentLoader::new(resolver),
            cache: RegistryCache::new(),
        }
    }

    /// Builder method to override the missing-manifest policy.
    pub fn with_missing_policy(mut self, missing: MissingManifest) -> Self {
        self.parser = self.parser.with_missing_policy(missing);
        self
    }

    /// Builder method to set discovery options.
    pub fn with_loader_options(mut self, options: LoaderOptions) -> Self {
        self.loader = self.loader.with_options(options);
        self
    }

    pub fn manifest_path(&self) -> &Path {
        self.parser.path()
    }

    pub fn state(&self) -> RegistryState {
        self.cache.state()
    }

    /// The cached agents, without triggering a load.
    pub fn cached(&self) -> Option<Arc<Vec<ResolvedComponent>>> {
        self.cache.items()
    }

    /// Load and return the enabled agents in configured order.
    ///
    /// Returns the cached list when one exists and `force_reload` is false.
    /// Any entry failing aborts the whole load with a
    /// [`RegistryError::ComponentLoad`] naming that entry; nothing partial is
    /// cached.
    pub fn load(&self, force_reload: bool) -> Result<Arc<Vec<ResolvedComponent>>> {
        self.cache.load_with(
            force_reload,
            || {
                log::info!("Loading agents from registry");
                self.parser.parse()
            },
            |document| self.load_document(document),
        )
    }

    /// Drop the cache and load again from a fresh parse.
    pub fn reload(&self) -> Result<Arc<Vec<ResolvedComponent>>> {
        log::info!("Reloading agents registry");
        self.cache.reload_with(
            || self.parser.parse(),
            |document| self.load_document(document),
        )
    }

    /// The raw manifest entry named `name`, whether or not loading succeeds.
    pub fn entry_config(
        &self,
        name: &str,
    ) -> std::result::Result<Option<ManifestEntry>, ConfigurationError> {
        let document = self.cache.document_or_parse(|| self.parser.parse())?;
        Ok(document.find(name).cloned())
    }

    /// Names of the currently loaded agents; empty before a successful load.
    pub fn loaded_names(&self) -> Vec<String> {
        self.cache
            .items()
            .map(|agents| agents.iter().map(|a| a.name().to_string()).collect())
            .unwrap_or_default()
    }

    fn load_document(&self, document: &ManifestDocument) -> Result<Vec<ResolvedComponent>> {
        let enabled = document.enabled_in_order();
        log::info!(
            "Found {} enabled agents out of {} total",
            enabled.len(),
            document.entries.len()
        );

        let mut loaded = Vec::with_capacity(enabled.len());
        for entry in enabled {
            let Some((name, locator)) = entry.agent_parts() else {
                log::warn!("Skipping incomplete agent configuration: {:?}", entry);
                continue;
            };

            match self.loader.load_entry(entry) {
                Ok(Some(agent)) => {
                    match entry.order {
                        Some(order) => log::info!("Loaded agent: {} (order: {})", name, order),
                        None => log::info!("Loaded agent: {}", name),
                    }
                    loaded.push(agent);
                }
                Ok(None) => {}
                Err(err) => {
                    log::error!("Failed to load agent '{}' from '{}': {}", name, locator, err);
                    return Err(RegistryError::wrap_entry(name, locator, err));
                }
            }
        }

        log::info!(
            "Successfully loaded {} agents: {:?}",
            loaded.len(),
            loaded.iter().map(|a| a.name()).collect::<Vec<_>>()
        );
        Ok(loaded)
    }
}
