//! Application layer for workbench-mcp
//!
//! This crate contains the dispatch use case, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    http_client::{HttpClientPort, HttpError, HttpRequestSpec, HttpResponse, RequestBody, ResponseBody},
    invocation_logger::{InvocationEvent, InvocationLogger, NoInvocationLogger},
    process_runner::{CommandOutput, CommandSpec, ProcessError, ProcessRunnerPort, RunOptions},
    sql_engine::{DatabaseError, QueryRows, SqlEngineKind, SqlEnginePort},
    tool_executor::ToolExecutorPort,
    tool_schema::ToolSchemaPort,
};
pub use use_cases::dispatch_tool::DispatchToolUseCase;
