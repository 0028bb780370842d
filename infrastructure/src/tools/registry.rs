//! Tool Registry
//!
//! The [`ToolRegistry`] aggregates tool providers and implements
//! [`ToolExecutorPort`]. It runs discovery once at startup, builds the
//! merged [`ToolSpec`], and routes each call to the provider that declared
//! the tool.
//!
//! # Usage
//!
//! ```ignore
//! let mut registry = ToolRegistry::new().register(GitProvider::new(runner, params));
//! registry.discover().await?;
//!
//! assert!(registry.has_tool("git_status"));
//! let output = registry.execute(&ToolCall::new("git_status")).await;
//! ```
//!
//! # Discovery
//!
//! 1. Providers are visited in registration order
//! 2. Unavailable providers are skipped
//! 3. Each provider's `discover_tools()` result is appended to the spec
//! 4. A tool name declared twice fails discovery

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use workbench_application::ToolExecutorPort;
use workbench_domain::{
    DomainError, ToolCall, ToolError, ToolOutput, ToolProvider, ToolSpec,
};

/// Tool registry that aggregates multiple providers
pub struct ToolRegistry {
    providers: Vec<Arc<dyn ToolProvider>>,
    /// Tool name -> provider ID mapping (built by discovery)
    tool_mapping: HashMap<String, String>,
    tool_spec: ToolSpec,
    discovered: bool,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            tool_mapping: HashMap::new(),
            tool_spec: ToolSpec::new(),
            discovered: false,
        }
    }

    /// Register a tool provider
    pub fn register<P: ToolProvider + 'static>(self, provider: P) -> Self {
        self.register_arc(Arc::new(provider))
    }

    /// Register a tool provider (Arc version)
    pub fn register_arc(mut self, provider: Arc<dyn ToolProvider>) -> Self {
        self.providers.push(provider);
        self.discovered = false;
        self
    }

    /// Discover tools from all providers.
    ///
    /// Must be called before the registry is used. A provider whose
    /// discovery fails contributes no tools; a duplicate tool name is an
    /// error.
    pub async fn discover(&mut self) -> Result<(), DomainError> {
        let mut tool_spec = ToolSpec::new();
        let mut tool_mapping = HashMap::new();

        for provider in &self.providers {
            if !provider.is_available().await {
                tracing::warn!(
                    provider = provider.id(),
                    "Provider not available, its tools will not be advertised"
                );
                continue;
            }

            match provider.discover_tools().await {
                Ok(tools) => {
                    for tool in tools {
                        tracing::debug!(
                            tool = %tool.name,
                            provider = provider.id(),
                            "Registered tool"
                        );
                        tool_mapping.insert(tool.name.clone(), provider.id().to_string());
                        tool_spec = tool_spec.register(tool)?;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.id(),
                        error = %e,
                        "Failed to discover tools from provider"
                    );
                }
            }
        }

        self.tool_spec = tool_spec;
        self.tool_mapping = tool_mapping;
        self.discovered = true;

        Ok(())
    }

    fn provider_for(&self, tool_name: &str) -> Option<&Arc<dyn ToolProvider>> {
        let provider_id = self.tool_mapping.get(tool_name)?;
        self.providers.iter().find(|p| p.id() == provider_id)
    }

    pub fn stats(&self) -> RegistryStats {
        let mut tools_per_provider = HashMap::new();
        for provider_id in self.tool_mapping.values() {
            *tools_per_provider.entry(provider_id.clone()).or_insert(0) += 1;
        }

        RegistryStats {
            total_providers: self.providers.len(),
            total_tools: self.tool_mapping.len(),
            tools_per_provider,
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the registry
#[derive(Debug, Clone)]
pub struct RegistryStats {
    pub total_providers: usize,
    pub total_tools: usize,
    pub tools_per_provider: HashMap<String, usize>,
}

#[async_trait]
impl ToolExecutorPort for ToolRegistry {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        if !self.discovered {
            return Err(ToolError::execution_failed(
                "Registry not initialized. Call discover() first.",
            ));
        }

        match self.provider_for(&call.tool_name) {
            Some(provider) => provider.execute(call).await,
            None => Err(ToolError::unknown_tool(&call.tool_name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{FakeHttp, FakeRunner};
    use crate::tools::{DevtoolsProvider, GitProvider, HttpProvider};
    use workbench_application::ExecutionParams;
    use workbench_domain::ErrorCode;

    fn git(runner: FakeRunner) -> GitProvider {
        GitProvider::new(Arc::new(runner), ExecutionParams::default())
    }

    #[tokio::test]
    async fn test_registry_lists_declared_tools_in_order() {
        let mut registry = ToolRegistry::new().register(git(FakeRunner::new()));
        registry.discover().await.unwrap();

        let names = registry.available_tools();
        assert_eq!(names.first(), Some(&"git_status"));
        assert_eq!(names.len(), 10);
        assert!(registry.has_tool("git_blame"));
    }

    #[tokio::test]
    async fn test_registry_routes_to_provider() {
        let mut registry = ToolRegistry::new()
            .register(git(FakeRunner::new().with_stdout("* main\n")));
        registry.discover().await.unwrap();

        let output = registry.execute(&ToolCall::new("git_branch")).await.unwrap();
        assert_eq!(output.to_text(), "* main\n");
    }

    #[tokio::test]
    async fn test_registry_passes_handler_failures_through() {
        let mut registry = ToolRegistry::new()
            .register(git(FakeRunner::new().with_exit(128, "", "fatal: bad revision")));
        registry.discover().await.unwrap();

        let err = registry
            .execute(&ToolCall::new("git_branch"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ExecutionFailed);
        assert!(err.message.contains("fatal: bad revision"));
        assert!(!err.message.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_registry_unknown_tool() {
        let mut registry = ToolRegistry::new().register(git(FakeRunner::new()));
        registry.discover().await.unwrap();

        let err = registry
            .execute(&ToolCall::new("docker_ps"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownTool);
    }

    #[tokio::test]
    async fn test_registry_not_discovered() {
        let registry = ToolRegistry::new().register(git(FakeRunner::new()));
        let err = registry
            .execute(&ToolCall::new("git_status"))
            .await
            .unwrap_err();
        assert!(err.message.contains("not initialized"));
    }

    #[tokio::test]
    async fn test_unavailable_provider_contributes_nothing() {
        let mut registry = ToolRegistry::new()
            .register(git(FakeRunner::new().without("git")))
            .register(HttpProvider::new(
                Arc::new(FakeHttp::new()),
                ExecutionParams::default(),
            ));
        registry.discover().await.unwrap();

        let stats = registry.stats();
        assert_eq!(stats.total_providers, 2);
        assert_eq!(stats.total_tools, 3);
        assert!(!stats.tools_per_provider.contains_key("git"));
        assert_eq!(stats.tools_per_provider.get("http"), Some(&3));
    }

    #[tokio::test]
    async fn test_duplicate_tool_names_fail_discovery() {
        let runner = Arc::new(FakeRunner::new());
        let mut registry = ToolRegistry::new()
            .register(DevtoolsProvider::new(runner.clone(), ExecutionParams::default()))
            .register(DevtoolsProvider::new(runner, ExecutionParams::default()));

        let err = registry.discover().await.unwrap_err();
        assert_eq!(err, DomainError::DuplicateTool("check_port".to_string()));
    }
}
