// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait and registry for the agent's tools.
//!
//! The [`Tool`] trait defines the interface the file-delivery tools
//! implement. The [`ToolRegistry`] manages lookup by name and produces the
//! Anthropic-format tool definitions for the provider request. Tools are
//! cheap request-scoped objects: the agent builds a fresh registry per
//! request so each tool is bound to that request's reply target.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use devmate_anthropic::ToolDefinition;
use devmate_core::DevmateError;

/// Output from a tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// The content returned to the model.
    pub content: String,
    /// Whether the invocation resulted in an error.
    pub is_error: bool,
}

impl ToolOutput {
    /// A successful output.
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// A failed output. The failure is reported to the model, not raised.
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// Interface implemented by every agent tool.
///
/// The agent loop calls `invoke` with the parsed JSON input from the
/// model's `tool_use` content block.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name (used for lookup and API serialization).
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Invoke the tool with the given JSON input.
    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, DevmateError>;
}

/// Registry of available tools, indexed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool. The tool is indexed by its `name()`.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Looks up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Anthropic-format tool definitions for all registered tools,
    /// sorted by name for a stable request shape.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.parameters_schema(),
            })
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PathTool;

    #[async_trait]
    impl Tool for PathTool {
        fn name(&self) -> &str {
            "resolve_path"
        }

        fn description(&self) -> &str {
            "Resolves a file path"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Path to resolve"}
                },
                "required": ["path"]
            })
        }

        async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, DevmateError> {
            match input["path"].as_str() {
                Some(path) => Ok(ToolOutput::ok(format!("/resolved{path}"))),
                None => Ok(ToolOutput::error("missing required 'path' parameter")),
            }
        }
    }

    #[test]
    fn registry_registers_and_retrieves() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(PathTool));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("resolve_path").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn definitions_carry_schema() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(PathTool));

        let defs = registry.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "resolve_path");
        assert_eq!(defs[0].input_schema["type"], "object");
        assert!(defs[0].input_schema["properties"]["path"].is_object());
    }

    #[tokio::test]
    async fn invoke_returns_output() {
        let tool = PathTool;
        let output = tool
            .invoke(serde_json::json!({"path": "/tmp/x"}))
            .await
            .unwrap();
        assert_eq!(output.content, "/resolved/tmp/x");
        assert!(!output.is_error);

        let output = tool.invoke(serde_json::json!({})).await.unwrap();
        assert!(output.is_error);
    }
}
