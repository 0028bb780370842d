//! Port for structured invocation logging.
//!
//! Defines the [`InvocationLogger`] trait for recording one event per
//! `tools/call` to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures an
//! audit trail of invocations in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured invocation event for logging.
pub struct InvocationEvent {
    /// Event type identifier (e.g., "tool_call").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl InvocationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging invocation events.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// `log` is synchronous and non-fallible; logging failures are ignored.
pub trait InvocationLogger: Send + Sync {
    /// Record an invocation event.
    fn log(&self, event: InvocationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoInvocationLogger;

impl InvocationLogger for NoInvocationLogger {
    fn log(&self, _event: InvocationEvent) {}
}
