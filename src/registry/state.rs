//! Registry lifecycle and cache.
//!
//! ```text
//! Unloaded → Loading → Loaded
//!               ↓  ↑       │ reload()
//!             Failed ←─────┘
//! ```
//!
//! `load`/`reload` are serialised by a mutex. The finished composition is
//! published as an `Arc<Vec<T>>` behind a read-write lock, so readers only
//! ever see a complete result.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::manifest::entry::ManifestDocument;
use crate::utilities::errors::{ConfigurationError, Result};

/// Where a registry is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryState {
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

struct Snapshot<T> {
    state: RegistryState,
    document: Option<Arc<ManifestDocument>>,
    items: Option<Arc<Vec<T>>>,
}

/// Cached result of a registry load plus the manifest it came from.
pub struct RegistryCache<T> {
    load_lock: Mutex<()>,
    snapshot: RwLock<Snapshot<T>>,
}

impl<T> std::fmt::Debug for RegistryCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryCache")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<T> Default for RegistryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RegistryCache<T> {
    pub fn new() -> Self {
        Self {
            load_lock: Mutex::new(()),
            snapshot: RwLock::new(Snapshot {
                state: RegistryState::Unloaded,
                document: None,
                items: None,
            }),
        }
    }

    pub fn state(&self) -> RegistryState {
        self.snapshot.read().state
    }

    /// The cached composition, if the last load succeeded.
    pub fn items(&self) -> Option<Arc<Vec<T>>> {
        self.snapshot.read().items.clone()
    }

    /// The most recently parsed manifest, whatever the load outcome.
    pub fn document(&self) -> Option<Arc<ManifestDocument>> {
        self.snapshot.read().document.clone()
    }

    /// Return the cache, or parse and build a fresh composition.
    ///
    /// A failed parse or build leaves nothing cached; the parsed document is
    /// kept even when building fails.
    pub fn load_with<P, B>(&self, force: bool, parse: P, build: B) -> Result<Arc<Vec<T>>>
    where
        P: FnOnce() -> std::result::Result<ManifestDocument, ConfigurationError>,
        B: FnOnce(&ManifestDocument) -> Result<Vec<T>>,
    {
        let _guard = self.load_lock.lock();

        if !force {
            if let Some(items) = self.items() {
                log::debug!("Returning cached composition ({} items)", items.len());
                return Ok(items);
            }
        }

        self.snapshot.write().state = RegistryState::Loading;
        self.rebuild(parse, build)
    }

    /// Drop the cached composition and manifest, then parse and build again.
    ///
    /// Both steps run under one acquisition of the load lock, so a
    /// concurrent `load_with` either sees the old composition or waits for
    /// the new one.
    pub fn reload_with<P, B>(&self, parse: P, build: B) -> Result<Arc<Vec<T>>>
    where
        P: FnOnce() -> std::result::Result<ManifestDocument, ConfigurationError>,
        B: FnOnce(&ManifestDocument) -> Result<Vec<T>>,
    {
        let _guard = self.load_lock.lock();
        {
            let mut snapshot = self.snapshot.write();
            snapshot.state = RegistryState::Loading;
            snapshot.document = None;
            snapshot.items = None;
        }
        self.rebuild(parse, build)
    }

    // Caller holds `load_lock`.
    fn rebuild<P, B>(&self, parse: P, build: B) -> Result<Arc<Vec<T>>>
    where
        P: FnOnce() -> std::result::Result<ManifestDocument, ConfigurationError>,
        B: FnOnce(&ManifestDocument) -> Result<Vec<T>>,
    {
        let document = match parse() {
            Ok(document) => Arc::new(document),
            Err(err) => {
                self.fail(None);
                return Err(err.into());
            }
        };

        match build(&document) {
            Ok(items) => {
                let items = Arc::new(items);
                let mut snapshot = self.snapshot.write();
                snapshot.state = RegistryState::Loaded;
                snapshot.document = Some(document);
                snapshot.items = Some(Arc::clone(&items));
                Ok(items)
            }
            Err(err) => {
                self.fail(Some(document));
                Err(err)
            }
        }
    }

    /// Parsed manifest, parsing it now if nothing has been parsed yet.
    pub fn document_or_parse<P>(
        &self,
        parse: P,
    ) -> std::result::Result<Arc<ManifestDocument>, ConfigurationError>
    where
        P: FnOnce() -> std::result::Result<ManifestDocument, ConfigurationError>,
    {
        if let Some(document) = self.document() {
            return Ok(document);
        }
        let _guard = self.load_lock.lock();
        if let Some(document) = self.document() {
            return Ok(document);
        }
        let document = Arc::new(parse()?);
        self.snapshot.write().document = Some(Arc::clone(&document));
        Ok(document)
    }

    /// Drop the cached composition and manifest.
    pub fn clear(&self) {
        let _guard = self.load_lock.lock();
        let mut snapshot = self.snapshot.write();
        snapshot.state = RegistryState::Unloaded;
        snapshot.document = None;
        snapshot.items = None;
    }

    fn fail(&self, document: Option<Arc<ManifestDocument>>) {
        let mut snapshot = self.snapshot.write();
        snapshot.state = RegistryState::Failed;
        snapshot.items = None;
        if document.is_some() {
            snapshot.document = document;
        }
    }
}
