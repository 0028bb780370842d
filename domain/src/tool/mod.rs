//! Tool domain module
//!
//! This module defines the core abstractions of the **tool-invocation
//! runtime**: how a named call with a JSON argument bag is described,
//! checked and answered.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ ToolResult           │
//! │ (catalog)    │    │ (invocation) │    │ {content, isError}   │
//! └──────────────┘    └──────────────┘    └──────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ToolSpec`]: Append-only catalog, unique names, registration order
//! - [`ToolDefinition`]: Name, description, parameters and risk level
//! - [`ToolCall`]: An invocation request with arguments
//! - [`ToolOutput`] / [`ToolError`]: Raw handler outcome
//! - [`ToolResult`]: The uniform envelope every outcome is folded into
//! - [`ToolValidator`]: Pure argument validation against the input shape
//! - [`ToolProvider`]: One server's catalog plus its handlers
//!
//! # Risk levels
//!
//! | Risk | Examples | Advertised as |
//! |------|----------|---------------|
//! | **Low** | `git_status`, `docker_ps`, `check_port` | `readOnlyHint: true` |
//! | **High** | `git_push`, `docker_exec`, `db_query` | `readOnlyHint: false` |

pub mod entities;
pub mod provider;
pub mod traits;
pub mod value_objects;

pub use entities::{RiskLevel, ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use provider::{ProviderError, ToolProvider};
pub use traits::{ShapeToolValidator, ToolValidator, describe_validation_errors};
pub use value_objects::{ContentBlock, ErrorCode, ToolError, ToolOutput, ToolResult};
