//! Registry façades over the loader: filtering, ordering, caching and reload.

pub mod agents_registry;
pub mod state;
pub mod tools_registry;

pub use agents_registry::AgentsRegistry;
pub use state::{RegistryCache, RegistryState};
pub use tools_registry::ToolsRegistry;
