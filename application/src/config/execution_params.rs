//! Execution parameters: per-invocation limits shared by all handlers.
//!
//! [`ExecutionParams`] groups the static parameters that bound how a tool
//! handler talks to the outside world: process deadlines, the default working
//! directory, and HTTP probe limits. These are application-layer concerns,
//! not domain policy; the infrastructure config loader builds them.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Execution limits for tool handlers.
///
/// | Parameter | Used by |
/// |-----------|---------|
/// | `process_timeout` | git, docker, devtools |
/// | `working_dir` | git, docker compose, devtools |
/// | `http_timeout` | http_request, test_endpoint, performance_test |
/// | `max_requests` | performance_test |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Deadline for one external process.
    pub process_timeout: Duration,
    /// Default working directory when a call supplies no `path`.
    pub working_dir: Option<String>,
    /// Default deadline for one HTTP request.
    pub http_timeout: Duration,
    /// Upper bound on `performance_test` iterations.
    pub max_requests: usize,
    /// `performance_test` iterations when the caller gives none.
    pub default_requests: usize,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            process_timeout: Duration::from_secs(30),
            working_dir: None,
            http_timeout: Duration::from_secs(30),
            max_requests: 1000,
            default_requests: 10,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_process_timeout(mut self, timeout: Duration) -> Self {
        self.process_timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_max_requests(mut self, max: usize) -> Self {
        self.max_requests = max;
        self
    }

    /// Resolve the working directory for a call: explicit path, then default
    pub fn resolve_dir(&self, path: Option<&str>) -> Option<String> {
        path.map(String::from).or_else(|| self.working_dir.clone())
    }

    /// Caller-supplied timeout in milliseconds, else the HTTP default
    pub fn http_timeout_or(&self, timeout_ms: Option<u64>) -> Duration {
        timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(self.http_timeout)
    }
}
