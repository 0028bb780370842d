//! Application-level configuration.
//!
//! - [`ExecutionParams`]: process, HTTP and working-directory limits for handlers

pub mod execution_params;

pub use execution_params::ExecutionParams;
