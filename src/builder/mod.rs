//! Root agent assembly.

pub mod agent_builder;

pub use agent_builder::AgentBuilder;
