//! # agent-registry
//!
//! Declarative composition of agents. A YAML manifest lists agents (and
//! their tools and sub-agents) by namespace locator; the registry resolves
//! each enabled entry through a pluggable [`Resolver`], attaches its tools
//! and sub-agents in configured order, and caches the result until an
//! explicit reload.
//!
//! ```ignore
//! use std::sync::Arc;
//! use agent_registry::{Agent, AgentsRegistry, Namespace, StaticResolver};
//!
//! let resolver = StaticResolver::new().with_namespace(
//!     Namespace::new("search_agent.sub_agents.wikipedia")
//!         .with_agent("wikipedia_agent", Agent::new("wikipedia")),
//! );
//! let registry = AgentsRegistry::new("agents_registry.yaml", Arc::new(resolver));
//! let agents = registry.load(false)?;
//! ```

pub mod agent;
pub mod builder;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod tools;
pub mod utilities;

pub use agent::{Agent, AgentProfile, ResolvedComponent};
pub use builder::AgentBuilder;
pub use loader::{AgentLoader, LoaderOptions};
pub use manifest::{ManifestDocument, ManifestEntry, ManifestKind, ManifestParser, MissingManifest};
pub use registry::{AgentsRegistry, RegistryState, ToolsRegistry};
pub use resolver::{Namespace, Resolver, StaticResolver, Symbol};
pub use tools::{ResolvedCapability, Tool};
pub use utilities::config::RegistryConfig;
pub use utilities::errors::{
    ConfigurationError, LoadFailure, RegistryError, ResolveError, Result,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
