//! Dispatch Tool use case.
//!
//! The single path every `tools/call` takes:
//!
//! ```text
//! lookup ──▶ validate arguments ──▶ handler ──▶ envelope
//!   │              │                   │
//!   └ UNKNOWN_TOOL └ INVALID_ARGUMENT  └ Err / panic → Failure
//! ```
//!
//! Nothing escapes [`DispatchToolUseCase::execute`]: every outcome, including
//! a panicking handler, becomes exactly one [`ToolResult`].

use crate::ports::invocation_logger::{InvocationEvent, InvocationLogger, NoInvocationLogger};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::tool_helpers::tool_args_preview;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use workbench_domain::tool::{
    entities::ToolCall,
    traits::{ShapeToolValidator, ToolValidator, describe_validation_errors},
    value_objects::{ToolError, ToolResult},
};

/// Use case for dispatching one tool invocation.
#[derive(Clone)]
pub struct DispatchToolUseCase {
    tool_executor: Arc<dyn ToolExecutorPort>,
    invocation_logger: Arc<dyn InvocationLogger>,
}

impl DispatchToolUseCase {
    pub fn new(tool_executor: Arc<dyn ToolExecutorPort>) -> Self {
        Self {
            tool_executor,
            invocation_logger: Arc::new(NoInvocationLogger),
        }
    }

    /// Create with an invocation logger.
    pub fn with_invocation_logger(mut self, logger: Arc<dyn InvocationLogger>) -> Self {
        self.invocation_logger = logger;
        self
    }

    pub fn tool_executor(&self) -> &Arc<dyn ToolExecutorPort> {
        &self.tool_executor
    }

    /// Dispatch a call and wrap its outcome into the envelope.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let started = Instant::now();
        info!(
            tool = %call.tool_name,
            "Dispatching tool call: {}",
            tool_args_preview(call)
        );

        let outcome = self.run(call).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(_) => debug!(tool = %call.tool_name, duration_ms, "Tool call succeeded"),
            Err(e) => warn!(tool = %call.tool_name, duration_ms, code = %e.code, "Tool call failed: {}", e.message),
        }

        let result = ToolResult::from_outcome(outcome);
        self.invocation_logger.log(InvocationEvent::new(
            "tool_call",
            serde_json::json!({
                "tool": call.tool_name,
                "arguments": call.arguments_value(),
                "isError": result.is_error,
                "errorCode": result.error_code.map(|c| c.as_str()),
                "durationMs": duration_ms,
            }),
        ));
        result
    }

    async fn run(&self, call: &ToolCall) -> Result<workbench_domain::ToolOutput, ToolError> {
        let definition = self
            .tool_executor
            .get_tool(&call.tool_name)
            .ok_or_else(|| ToolError::unknown_tool(&call.tool_name))?;

        ShapeToolValidator
            .validate(call, definition)
            .map_err(|errors| {
                ToolError::invalid_argument(describe_validation_errors(&call.tool_name, &errors))
            })?;

        AssertUnwindSafe(self.tool_executor.execute(call))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(ToolError::execution_failed(format!(
                    "Tool '{}' panicked: {}",
                    call.tool_name, reason
                )))
            })
    }
}
