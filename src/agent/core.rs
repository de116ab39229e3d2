//! Core Agent value type.
//!
//! An [`Agent`] is the component the registry composes: identity fields
//! (name, model, description, instruction) plus an ordered list of tools and
//! an ordered list of sub-agents. Agents are immutable once built and shared
//! behind [`Arc`]. Attaching new tools or sub-agents produces a new value via
//! [`Agent::with_capabilities`] and leaves the original untouched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::tools::base_tool::Tool;

/// An agent instance after resolution.
pub type ResolvedComponent = Arc<Agent>;

/// Identity fields of an agent, copied verbatim on every rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Unique name of the agent.
    pub name: String,
    /// Opaque model identifier (e.g. `"openrouter/x-ai/grok-4.1-fast:free"`).
    #[serde(default)]
    pub model: String,
    /// What the agent is for.
    #[serde(default)]
    pub description: String,
    /// System instruction handed to the model.
    #[serde(default)]
    pub instruction: String,
}

/// A composable agent holding tools and sub-agents.
#[derive(Debug, Clone)]
pub struct Agent {
    profile: AgentProfile,
    tools: Vec<Tool>,
    sub_agents: Vec<ResolvedComponent>,
}

impl Agent {
    /// Create an agent with the given name and empty profile fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_profile(AgentProfile {
            name: name.into(),
            ..AgentProfile::default()
        })
    }

    pub fn from_profile(profile: AgentProfile) -> Self {
        Self {
            profile,
            tools: Vec::new(),
            sub_agents: Vec::new(),
        }
    }

    /// Builder method to set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.profile.model = model.into();
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.profile.description = description.into();
        self
    }

    /// Builder method to set the instruction.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.profile.instruction = instruction.into();
        self
    }

    /// Builder method to set the initial tools.
    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    /// Builder method to set the initial sub-agents.
    pub fn with_sub_agents(mut self, sub_agents: Vec<ResolvedComponent>) -> Self {
        self.sub_agents = sub_agents;
        self
    }

    /// Build a new agent with the same profile and the given tools and
    /// sub-agents. Existing tools and sub-agents are replaced, not merged.
    pub fn with_capabilities(&self, tools: Vec<Tool>, sub_agents: Vec<ResolvedComponent>) -> Agent {
        Agent {
            profile: self.profile.clone(),
            tools,
            sub_agents,
        }
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn model(&self) -> &str {
        &self.profile.model
    }

    pub fn description(&self) -> &str {
        &self.profile.description
    }

    pub fn instruction(&self) -> &str {
        &self.profile.instruction
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn sub_agents(&self) -> &[ResolvedComponent] {
        &self.sub_agents
    }

    /// Names of the attached tools, in order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(Tool::name).collect()
    }

    /// Names of the direct sub-agents, in order.
    pub fn sub_agent_names(&self) -> Vec<&str> {
        self.sub_agents.iter().map(|a| a.name()).collect()
    }

    /// Depth-first search for a descendant (or self) by name.
    pub fn find(&self, name: &str) -> Option<&Agent> {
        if self.name() == name {
            return Some(self);
        }
        self.sub_agents.iter().find_map(|child| child.find(name))
    }
}
