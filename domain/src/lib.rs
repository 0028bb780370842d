//! Domain layer for workbench-mcp
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Tool catalog**: [`ToolSpec`] of [`ToolDefinition`]s, one catalog per [`ServerKind`]
//! - **Envelope**: every invocation ends as one [`ToolResult`] `{content, isError}`
//! - **Shapes**: the [`Shape`] subset used to advertise inputs and to
//!   [`validate`] values structurally
//! - **Pure parsers**: [`parse_blame`], [`classify`], [`PerformanceSummary`]

pub mod core;
pub mod probe;
pub mod server;
pub mod shape;
pub mod tool;
pub mod vcs;

// Re-export commonly used types
pub use core::{error::DomainError, string::truncate_output};
pub use probe::{EndpointReport, PerformanceSummary, RequestTiming, ScenarioResult, TestScenario};
pub use server::ServerKind;
pub use shape::{Shape, ShapeType, ValidationError, ValidationErrorKind, validate};
pub use tool::{
    ContentBlock, ErrorCode, ProviderError, RiskLevel, ShapeToolValidator, ToolCall,
    ToolDefinition, ToolError, ToolOutput, ToolParameter, ToolProvider, ToolResult, ToolSpec,
    ToolValidator, describe_validation_errors,
};
pub use vcs::{BlameLine, ChangeRecord, ChangeStatus, CommitSuggestion, classify, parse_blame};
