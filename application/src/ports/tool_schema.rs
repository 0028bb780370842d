//! Tool schema conversion port.
//!
//! Separates "which tools exist" (domain) from "how they are advertised on
//! the wire" (infrastructure).

use workbench_domain::tool::entities::{ToolDefinition, ToolSpec};

/// Port for converting tool definitions to the `tools/list` format.
pub trait ToolSchemaPort: Send + Sync {
    /// Convert a single tool definition to its advertised JSON form.
    fn tool_to_schema(&self, tool: &ToolDefinition) -> serde_json::Value;

    /// Convert all tools, in registration order.
    fn all_tools_schema(&self, spec: &ToolSpec) -> Vec<serde_json::Value> {
        spec.all().map(|t| self.tool_to_schema(t)).collect()
    }
}
