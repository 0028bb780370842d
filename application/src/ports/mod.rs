//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod http_client;
pub mod invocation_logger;
pub mod process_runner;
pub mod sql_engine;
pub mod tool_executor;
pub mod tool_schema;
