//! Agents: the components a registry composes.

pub mod core;

pub use self::core::{Agent, AgentProfile, ResolvedComponent};
