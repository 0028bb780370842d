//! Tool Executor port
//!
//! Defines the interface for routing a validated call to its handler.

use async_trait::async_trait;
use workbench_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolSpec},
    value_objects::{ToolError, ToolOutput},
};

/// Port for tool execution
///
/// This port defines how the application layer reaches tool handlers.
/// Implementations (adapters) live in the infrastructure layer. The
/// returned value is the raw handler outcome; the dispatcher wraps it.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().contains(name)
    }

    /// Get the definition of a specific tool
    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get(name)
    }

    /// Get names of all available tools
    fn available_tools(&self) -> Vec<&str> {
        self.tool_spec().names().collect()
    }

    /// Execute a tool call asynchronously
    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ToolError>;
}
