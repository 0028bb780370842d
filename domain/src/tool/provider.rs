//! Tool provider abstraction
//!
//! This module defines the [`ToolProvider`] trait. Each of the five servers
//! (git, docker, http, database, devtools) is one provider: it owns a static
//! catalog of [`ToolDefinition`]s and routes calls to typed handlers.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            DispatchToolUseCase              │
//! │  (lookup + eager validation + envelope)     │
//! └─────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌─────────────────────────────────────────────┐
//! │                ToolRegistry                 │
//! │        (catalog + routing by name)          │
//! └─────────────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌──────────────┐
//!               │ ToolProvider │  git | docker | http | database | devtools
//!               └──────────────┘
//! ```
//!
//! A provider never builds the envelope itself: `execute` returns the raw
//! handler outcome, the registry passes it through unchanged, and the
//! dispatcher folds it into a `ToolResult`.

use async_trait::async_trait;
use thiserror::Error;

use super::entities::{ToolCall, ToolDefinition};
use super::value_objects::{ToolError, ToolOutput};

/// Error type for tool provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider is not available (e.g., `docker` not installed)
    #[error("Provider not available: {0}")]
    NotAvailable(String),

    /// The provider's catalog could not be built
    #[error("Discovery failed: {0}")]
    DiscoveryFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Tool provider abstraction - one server's catalog and handlers
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Unique identifier for this provider
    ///
    /// Examples: "git", "docker", "database"
    fn id(&self) -> &str;

    /// Display name for user-facing output
    fn display_name(&self) -> &str;

    /// Check if the provider's external dependency is present
    ///
    /// For process-backed servers this checks that the binary is on `PATH`.
    async fn is_available(&self) -> bool;

    /// The tools this provider exposes, in advertised order
    async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError>;

    /// Execute a tool call
    ///
    /// The tool_name in the call must match one of the tools
    /// returned by `discover_tools()`. Arguments have already been
    /// checked against the tool's input shape.
    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ToolError>;

    /// Check if this provider has a specific tool
    async fn has_tool(&self, tool_name: &str) -> bool {
        match self.discover_tools().await {
            Ok(tools) => tools.iter().any(|t| t.name == tool_name),
            Err(_) => false,
        }
    }
}
