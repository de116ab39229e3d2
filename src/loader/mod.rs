//! Loader: turns manifest entries into agents.

pub mod agent_loader;
pub mod discovery;

pub use agent_loader::AgentLoader;
pub use discovery::{discover_agent, LoaderOptions};
