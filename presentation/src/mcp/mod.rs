//! MCP stdio channel: JSON-RPC framing and method handling

pub mod protocol;
pub mod server;

pub use server::{McpError, McpServer};
