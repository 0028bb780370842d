//! Infrastructure layer for workbench-mcp
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: process execution, outbound HTTP, SQL engines,
//! invocation logging, configuration file loading, and the five tool
//! providers.

pub mod config;
pub mod database;
pub mod http;
pub mod logging;
pub mod process;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigError, ConfigIssue, ConfigLoader, FileConfig, Severity};
pub use database::SqlEngines;
pub use http::{DEFAULT_USER_AGENT, ReqwestHttpClient};
pub use logging::JsonlInvocationLogger;
pub use process::TokioProcessRunner;
pub use tools::{McpToolSchema, RegistryStats, ToolDependencies, ToolRegistry, build_provider};
