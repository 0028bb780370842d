//! Aggregate statistics for repeated timed requests

use serde::Serialize;

/// Outcome of one timed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTiming {
    pub duration_ms: u64,
    pub succeeded: bool,
    /// Failure description when `succeeded` is false
    pub error: Option<String>,
}

impl RequestTiming {
    pub fn success(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            succeeded: true,
            error: None,
        }
    }

    pub fn failure(duration_ms: u64, error: impl Into<String>) -> Self {
        Self {
            duration_ms,
            succeeded: false,
            error: Some(error.into()),
        }
    }
}

/// Summary of a load probe.
///
/// Average, min and max are computed over successful requests only; with no
/// successes they are all zero. `raw_durations` lists every attempt in
/// issuance order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub count: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub average_millis: f64,
    pub min_millis: u64,
    pub max_millis: u64,
    pub raw_durations: Vec<u64>,
    pub raw_errors: Vec<String>,
}

impl PerformanceSummary {
    pub fn from_timings(timings: &[RequestTiming]) -> Self {
        let successes: Vec<u64> = timings
            .iter()
            .filter(|t| t.succeeded)
            .map(|t| t.duration_ms)
            .collect();

        let average_millis = if successes.is_empty() {
            0.0
        } else {
            successes.iter().sum::<u64>() as f64 / successes.len() as f64
        };

        Self {
            count: timings.len(),
            success_count: successes.len(),
            failure_count: timings.len() - successes.len(),
            average_millis,
            min_millis: successes.iter().copied().min().unwrap_or(0),
            max_millis: successes.iter().copied().max().unwrap_or(0),
            raw_durations: timings.iter().map(|t| t.duration_ms).collect(),
            raw_errors: timings.iter().filter_map(|t| t.error.clone()).collect(),
        }
    }
}
