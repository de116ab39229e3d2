//! Registration-map resolver.
//!
//! Namespaces are registered up front, either ready-made or as a lazy
//! initialiser that runs on first open. Locators are dotted paths
//! (`search_agent.sub_agents.wikipedia`); prefix aliases rewrite a leading
//! segment group before lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use super::namespace::Namespace;
use super::Resolver;
use crate::utilities::errors::{BoxError, ResolveError};

type NamespaceInit = Arc<dyn Fn() -> Result<Namespace, BoxError> + Send + Sync>;

enum Slot {
    Ready(Arc<Namespace>),
    Lazy {
        init: NamespaceInit,
        cell: OnceCell<Arc<Namespace>>,
    },
}

/// Resolver backed by explicitly registered namespaces.
#[derive(Default)]
pub struct StaticResolver {
    namespaces: RwLock<HashMap<String, Arc<Slot>>>,
    /// Locator prefix aliases (e.g. `"wiki"` -> `"search_agent.sub_agents.wikipedia"`).
    aliases: RwLock<HashMap<String, String>>,
}

impl fmt::Debug for StaticResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticResolver")
            .field("namespaces", &self.locators())
            .field("aliases", &*self.aliases.read())
            .finish()
    }
}

impl StaticResolver {
    /// Create a new empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ready namespace under its own locator.
    pub fn register(&self, namespace: Namespace) {
        let locator = namespace.locator().to_string();
        self.namespaces
            .write()
            .insert(locator, Arc::new(Slot::Ready(Arc::new(namespace))));
    }

    /// Builder form of [`StaticResolver::register`].
    pub fn with_namespace(self, namespace: Namespace) -> Self {
        self.register(namespace);
        self
    }

    /// Register a namespace built on first open.
    ///
    /// A successful build is kept; a failed one is retried on the next open.
    pub fn register_lazy<F>(&self, locator: impl Into<String>, init: F)
    where
        F: Fn() -> Result<Namespace, BoxError> + Send + Sync + 'static,
    {
        self.namespaces.write().insert(
            locator.into(),
            Arc::new(Slot::Lazy {
                init: Arc::new(init),
                cell: OnceCell::new(),
            }),
        );
    }

    /// Remove a namespace. Returns whether one was registered.
    pub fn unregister(&self, locator: &str) -> bool {
        self.namespaces.write().remove(locator).is_some()
    }

    /// Register a locator prefix alias.
    pub fn add_alias(&self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases.write().insert(alias.into(), target.into());
    }

    pub fn contains(&self, locator: &str) -> bool {
        let resolved = self.resolve_alias(locator);
        self.namespaces.read().contains_key(&resolved)
    }

    /// Registered locators, sorted.
    pub fn locators(&self) -> Vec<String> {
        let mut locators: Vec<String> = self.namespaces.read().keys().cloned().collect();
        locators.sort();
        locators
    }

    pub fn len(&self) -> usize {
        self.namespaces.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.read().is_empty()
    }

    /// Rewrite the longest aliased prefix of a dotted locator.
    fn resolve_alias(&self, locator: &str) -> String {
        let aliases = self.aliases.read();
        let best = aliases
            .iter()
            .filter(|(alias, _)| {
                locator == alias.as_str()
                    || (locator.starts_with(alias.as_str())
                        && locator[alias.len()..].starts_with('.'))
            })
            .max_by_key(|(alias, _)| alias.len());
        match best {
            Some((alias, target)) => format!("{}{}", target, &locator[alias.len()..]),
            None => locator.to_string(),
        }
    }
}

impl Resolver for StaticResolver {
    fn open_namespace(&self, locator: &str) -> Result<Arc<Namespace>, ResolveError> {
        let resolved = self.resolve_alias(locator);
        // Clone the slot out so a slow initialiser does not hold the map lock.
        let slot = self
            .namespaces
            .read()
            .get(&resolved)
            .cloned()
            .ok_or_else(|| ResolveError::NamespaceNotFound {
                locator: locator.to_string(),
            })?;

        match &*slot {
            Slot::Ready(namespace) => Ok(Arc::clone(namespace)),
            Slot::Lazy { init, cell } => cell
                .get_or_try_init(|| {
                    log::debug!("Initialising namespace: {}", resolved);
                    init().map(Arc::new)
                })
                .map(Arc::clone)
                .map_err(|source| ResolveError::NamespaceInit {
                    locator: locator.to_string(),
                    source,
                }),
        }
    }
}
