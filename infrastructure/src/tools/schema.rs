//! MCP tool descriptor converter.
//!
//! Renders a [`ToolDefinition`] as the descriptor advertised by `tools/list`:
//! `{name, description, inputSchema, annotations}`.

use workbench_application::ToolSchemaPort;
use workbench_domain::ToolDefinition;

/// Descriptor format of the MCP `tools/list` response.
///
/// `inputSchema` is the definition's input shape rendered as JSON Schema;
/// `annotations.readOnlyHint` is true for low-risk tools.
pub struct McpToolSchema;

impl ToolSchemaPort for McpToolSchema {
    fn tool_to_schema(&self, tool: &ToolDefinition) -> serde_json::Value {
        serde_json::json!({
            "name": tool.name,
            "description": tool.description,
            "inputSchema": tool.input_shape().to_json(),
            "annotations": {
                "readOnlyHint": tool.risk_level.is_read_only(),
            },
        })
    }
}
