//! Symbol resolution: locating concrete objects by namespace path and name.
//!
//! The loader never imports anything itself. It asks a [`Resolver`] to open
//! a namespace and read symbols from it. [`StaticResolver`] backs this with
//! explicit registration. Other programs can plug in their own lookup
//! (compiled-in tables, plugin hosts).
//!
//! A resolver is a pure lookup: it knows nothing about manifests, `enabled`
//! flags or ordering.

pub mod namespace;
pub mod static_resolver;

use std::sync::Arc;

pub use namespace::{Namespace, Symbol};
pub use static_resolver::StaticResolver;

use crate::tools::base_tool::Tool;
use crate::utilities::errors::ResolveError;

/// Pluggable namespace lookup.
pub trait Resolver: Send + Sync {
    /// Open the namespace at `locator`.
    ///
    /// Returns [`ResolveError::NamespaceNotFound`] when nothing is known under
    /// that locator; any other error means the namespace exists but could not
    /// be produced.
    fn open_namespace(&self, locator: &str) -> Result<Arc<Namespace>, ResolveError>;

    /// Read one symbol from an opened namespace.
    fn find_symbol(&self, namespace: &Namespace, name: &str) -> Result<Symbol, ResolveError> {
        namespace
            .get(name)
            .cloned()
            .ok_or_else(|| ResolveError::SymbolNotFound {
                locator: namespace.locator().to_string(),
                symbol: name.to_string(),
            })
    }

    /// Open `locator` and read `name` from it.
    fn resolve(&self, locator: &str, name: &str) -> Result<Symbol, ResolveError> {
        let namespace = self.open_namespace(locator)?;
        self.find_symbol(&namespace, name)
    }

    /// Resolve `name` to a tool.
    ///
    /// A tool symbol is returned as-is; a factory is invoked once with no
    /// arguments and must return the tool. Anything else is not callable.
    fn resolve_tool(&self, locator: &str, name: &str) -> Result<Tool, ResolveError> {
        match self.resolve(locator, name)? {
            Symbol::Tool(tool) => Ok(tool),
            Symbol::Factory(factory) => factory().map_err(|source| ResolveError::Invocation {
                locator: locator.to_string(),
                symbol: name.to_string(),
                source,
            }),
            other => Err(ResolveError::NotCallable {
                locator: locator.to_string(),
                symbol: name.to_string(),
                found: other.kind(),
            }),
        }
    }
}
