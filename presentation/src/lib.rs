//! Presentation layer for workbench-mcp
//!
//! This crate contains the CLI definitions and the MCP stdio channel that
//! puts one server's catalog on the wire.

pub mod cli;
pub mod mcp;

// Re-export commonly used types
pub use cli::commands::{Cli, Command};
pub use mcp::{McpError, McpServer};
