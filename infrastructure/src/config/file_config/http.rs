//! HTTP probe configuration from TOML (`[http]` section)

use serde::{Deserialize, Serialize};

/// Raw HTTP harness configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHttpConfig {
    /// Default request deadline in milliseconds (default: 30000)
    pub timeout_ms: u64,
    /// User-Agent sent with every probe
    pub user_agent: String,
    /// Upper bound for `performance_test` iterations (default: 1000)
    pub max_requests: usize,
    /// `performance_test` iterations when none are given (default: 10)
    pub default_requests: usize,
}

impl Default for FileHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            user_agent: crate::http::DEFAULT_USER_AGENT.to_string(),
            max_requests: 1000,
            default_requests: 10,
        }
    }
}
