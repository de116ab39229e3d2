//! Error types for the agent registry.
//!
//! Three layers, each its own enum:
//!
//! - [`ConfigurationError`]: manifest and settings problems found while
//!   reading or validating a document.
//! - [`ResolveError`]: failures of a single namespace/symbol lookup.
//! - [`RegistryError`]: what crosses the public boundary of the loader and
//!   the registries.

use std::path::PathBuf;

use thiserror::Error;

/// Opaque error returned by user-supplied callables (tools, factories,
/// namespace initialisers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors raised while reading or validating a manifest or a settings file.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Strict registries require the manifest to exist.
    #[error("Configuration file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Error reading configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content is not valid YAML.
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document is empty or `null`.
    #[error("Configuration file is empty")]
    Empty,

    /// The document root is not a mapping.
    #[error("Configuration root must be a mapping")]
    NotAMapping,

    /// The expected top-level list key is absent.
    #[error("Configuration must contain '{key}' key")]
    MissingKey { key: &'static str },

    /// The top-level key is present but is not a list.
    #[error("'{key}' must be a list")]
    NotAList { key: &'static str },

    /// One entry could not be decoded (wrong field types, not a mapping, ...).
    #[error("Invalid entry at {list}[{index}]: {source}")]
    InvalidEntry {
        list: String,
        index: usize,
        #[source]
        source: serde_yaml::Error,
    },

    /// Two entries in the same list share a `(name, module)` pair.
    #[error(
        "Duplicate configuration found in '{list}': '{name}' with module '{locator}' \
         is defined at positions {first} and {second}"
    )]
    DuplicateEntry {
        list: String,
        name: String,
        locator: String,
        first: usize,
        second: usize,
    },

    /// Two enabled entries in the same list share an `order` value.
    #[error("Duplicate order {order} among enabled entries in '{list}': '{first}' and '{second}'")]
    DuplicateOrder {
        list: String,
        order: i64,
        first: String,
        second: String,
    },

    /// A settings value is present but unusable.
    #[error("Invalid setting '{key}': {message}")]
    InvalidSetting { key: String, message: String },
}

/// Failure of one lookup performed by a [`crate::resolver::Resolver`].
///
/// `NamespaceNotFound` is its own kind; every other variant belongs to the
/// symbol-load family.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The locator does not name any known namespace.
    #[error("namespace '{locator}' not found")]
    NamespaceNotFound { locator: String },

    /// The namespace exists but building it failed.
    #[error("error initialising namespace '{locator}': {source}")]
    NamespaceInit {
        locator: String,
        #[source]
        source: BoxError,
    },

    /// The namespace has no symbol with that name.
    #[error("symbol '{symbol}' not found in namespace '{locator}'")]
    SymbolNotFound { locator: String, symbol: String },

    /// The symbol exists but cannot be invoked.
    #[error("'{symbol}' in namespace '{locator}' is not callable (found {found})")]
    NotCallable {
        locator: String,
        symbol: String,
        found: &'static str,
    },

    /// Invoking a factory symbol failed.
    #[error("failed to execute '{symbol}' from '{locator}': {source}")]
    Invocation {
        locator: String,
        symbol: String,
        #[source]
        source: BoxError,
    },
}

impl ResolveError {
    /// `true` when the namespace itself is missing, as opposed to a problem
    /// with a symbol inside an existing namespace.
    pub fn is_namespace_not_found(&self) -> bool {
        matches!(self, ResolveError::NamespaceNotFound { .. })
    }
}

/// Why a component could not be loaded from an existing namespace.
#[derive(Debug, Error)]
pub enum LoadFailure {
    /// Opening the namespace or reading a symbol failed.
    #[error(transparent)]
    Resolve(ResolveError),

    /// Several suffix-matching candidates and none matches the requested name.
    #[error("multiple agent instances found: {candidates:?}; cannot determine which one to use")]
    Ambiguous { candidates: Vec<String> },

    /// The namespace exports no agent instance at all.
    #[error("no agent instance found; the namespace must export an agent")]
    NoInstance,

    /// A nested tool entry failed to resolve.
    #[error("failed to load tool '{tool}': {source}")]
    Tool {
        tool: String,
        #[source]
        source: ResolveError,
    },

    /// A nested sub-agent entry failed to load.
    #[error("failed to load sub-agent '{name}': {source}")]
    SubAgent {
        name: String,
        #[source]
        source: Box<RegistryError>,
    },

    /// Wraps an error raised further down, adding entry context.
    #[error(transparent)]
    Cause(Box<RegistryError>),
}

/// Errors surfaced by the loader and the registries.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The locator's namespace does not exist.
    #[error("Failed to import module '{locator}' for agent '{component}': {source}")]
    ComponentNotFound {
        component: String,
        locator: String,
        #[source]
        source: ResolveError,
    },

    /// The namespace exists but the component could not be produced from it.
    #[error("Failed to load agent '{component}' from '{locator}': {reason}")]
    ComponentLoad {
        component: String,
        locator: String,
        #[source]
        reason: LoadFailure,
    },

    /// A `(module, name)` pair reappeared among its own ancestors.
    #[error("Cyclic agent configuration: {}", path.join(" -> "))]
    CyclicConfiguration { path: Vec<String> },

    /// A top-level tools registry entry failed.
    #[error("Failed to load tool '{tool}' from '{locator}.{function}': {source}")]
    ToolLoad {
        tool: String,
        locator: String,
        function: String,
        #[source]
        source: ResolveError,
    },
}

impl RegistryError {
    /// Follow boxed causes down to the innermost registry error.
    ///
    /// The registry wraps every per-entry failure in a `ComponentLoad` naming
    /// the entry; this returns the error that started it.
    pub fn root_cause(&self) -> &RegistryError {
        match self {
            RegistryError::ComponentLoad {
                reason: LoadFailure::Cause(inner),
                ..
            }
            | RegistryError::ComponentLoad {
                reason: LoadFailure::SubAgent { source: inner, .. },
                ..
            } => inner.root_cause(),
            other => other,
        }
    }

    /// Name of the entry this error is about, when there is one.
    pub fn component(&self) -> Option<&str> {
        match self {
            RegistryError::ComponentNotFound { component, .. }
            | RegistryError::ComponentLoad { component, .. } => Some(component),
            RegistryError::ToolLoad { tool, .. } => Some(tool),
            _ => None,
        }
    }

    pub(crate) fn wrap_entry(component: &str, locator: &str, cause: RegistryError) -> Self {
        RegistryError::ComponentLoad {
            component: component.to_string(),
            locator: locator.to_string(),
            reason: LoadFailure::Cause(Box::new(cause)),
        }
    }
}
