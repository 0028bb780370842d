//! Tool providers for the five servers
//!
//! Each server is one [`ToolProvider`]. A provider owns its static catalog of
//! [`ToolDefinition`]s and routes `execute` by tool-name constant to a typed
//! handler; handlers deserialize an explicit argument record after the
//! dispatcher has validated the call against the declared shape.
//!
//! | Server | Provider | Reaches |
//! |--------|----------|---------|
//! | git | [`GitProvider`] | `git` via [`ProcessRunnerPort`] |
//! | docker | [`DockerProvider`] | `docker` via [`ProcessRunnerPort`] |
//! | http | [`HttpProvider`] | [`HttpClientPort`] |
//! | database | [`DatabaseProvider`] | [`SqlEngines`] |
//! | devtools | [`DevtoolsProvider`] | `lsof`, `npm`, `package.json` |
//!
//! The [`ToolRegistry`] aggregates providers and implements
//! [`ToolExecutorPort`](workbench_application::ToolExecutorPort).

pub mod database;
pub mod devtools;
pub mod docker;
pub mod git;
pub mod http;

mod registry;
mod schema;

#[cfg(test)]
pub(crate) mod testing;

pub use database::DatabaseProvider;
pub use devtools::DevtoolsProvider;
pub use docker::DockerProvider;
pub use git::GitProvider;
pub use http::HttpProvider;
pub use registry::{RegistryStats, ToolRegistry};
pub use schema::McpToolSchema;

use serde::de::DeserializeOwned;
use std::sync::Arc;
use workbench_application::{ExecutionParams, HttpClientPort, ProcessRunnerPort};
use workbench_domain::{ServerKind, ToolCall, ToolDefinition, ToolError, ToolParameter, ToolProvider};

use crate::database::SqlEngines;

/// Shared collaborators handed to every provider
#[derive(Clone)]
pub struct ToolDependencies {
    pub runner: Arc<dyn ProcessRunnerPort>,
    pub http: Arc<dyn HttpClientPort>,
    pub engines: SqlEngines,
    pub params: ExecutionParams,
}

/// Build the provider serving `kind`
pub fn build_provider(kind: ServerKind, deps: &ToolDependencies) -> Arc<dyn ToolProvider> {
    match kind {
        ServerKind::Git => Arc::new(GitProvider::new(deps.runner.clone(), deps.params.clone())),
        ServerKind::Docker => {
            Arc::new(DockerProvider::new(deps.runner.clone(), deps.params.clone()))
        }
        ServerKind::Http => Arc::new(HttpProvider::new(deps.http.clone(), deps.params.clone())),
        ServerKind::Database => Arc::new(DatabaseProvider::new(deps.engines.clone())),
        ServerKind::Devtools => {
            Arc::new(DevtoolsProvider::new(deps.runner.clone(), deps.params.clone()))
        }
    }
}

/// Deserialize a call's arguments into a handler's argument record
pub(crate) fn parse_args<T: DeserializeOwned>(call: &ToolCall) -> Result<T, ToolError> {
    call.parse_args().map_err(ToolError::invalid_argument)
}

/// The optional `path` working-directory parameter shared by process tools
pub(crate) fn path_parameter() -> ToolParameter {
    ToolParameter::new(
        "path",
        "Working directory (defaults to the configured directory)",
        false,
    )
}

pub(crate) fn unknown(call: &ToolCall) -> ToolError {
    ToolError::unknown_tool(&call.tool_name)
}

/// Tool names in a definition list, for tests and diagnostics
pub fn tool_names(definitions: &[ToolDefinition]) -> Vec<&str> {
    definitions.iter().map(|d| d.name.as_str()).collect()
}
