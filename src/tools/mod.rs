//! Tools attached to agents.

pub mod base_tool;

pub use base_tool::{Tool, ToolFactory, ToolFn};

/// A tool after resolution.
pub type ResolvedCapability = Tool;
