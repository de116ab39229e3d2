//! Tool definitions.
//!
//! A [`Tool`] is the capability attached to an agent: an opaque callable with a
//! name. The registry never inspects what the callable does; it only locates
//! tools, orders them and hands them to agents.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::utilities::errors::BoxError;

/// Type alias for a shared synchronous tool function.
pub type ToolFn = Arc<dyn Fn(HashMap<String, Value>) -> Result<Value, BoxError> + Send + Sync>;

/// Zero-argument constructor that produces a tool when invoked.
pub type ToolFactory = Arc<dyn Fn() -> Result<Tool, BoxError> + Send + Sync>;

/// An invocable capability.
///
/// Cloning is cheap: the wrapped function is reference counted, so clones
/// share the same callable.
#[derive(Clone)]
pub struct Tool {
    name: String,
    description: String,
    func: ToolFn,
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

impl Tool {
    /// Create a new tool wrapping the given function.
    pub fn new(name: impl Into<String>, func: ToolFn) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            func,
        }
    }

    /// Convenience constructor from a plain closure.
    pub fn from_fn<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(HashMap<String, Value>) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self::new(name, Arc::new(func))
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Invoke the tool.
    pub fn call(&self, args: HashMap<String, Value>) -> Result<Value, BoxError> {
        (self.func)(args)
    }

    /// `true` if both handles wrap the same callable.
    pub fn same_callable(&self, other: &Tool) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_passes_arguments() {
        let tool = Tool::from_fn("get_current_time", |args| {
            let city = args
                .get("city")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            Ok(json!({"status": "success", "city": city, "time": "10:30 AM"}))
        })
        .with_description("Returns the current time in a city");

        let mut args = HashMap::new();
        args.insert("city".to_string(), json!("Dublin"));
        let out = tool.call(args).unwrap();
        assert_eq!(out["city"], "Dublin");
        assert_eq!(tool.name(), "get_current_time");
        assert_eq!(tool.description(), "Returns the current time in a city");
    }

    #[test]
    fn test_clones_share_callable() {
        let tool = Tool::from_fn("noop", |_| Ok(Value::Null));
        let other = Tool::from_fn("noop", |_| Ok(Value::Null));
        assert!(tool.same_callable(&tool.clone()));
        assert!(!tool.same_callable(&other));
    }

    #[test]
    fn test_errors_propagate() {
        let tool = Tool::from_fn("fails", |_| Err("backend unavailable".into()));
        let err = tool.call(HashMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "backend unavailable");
    }
}
