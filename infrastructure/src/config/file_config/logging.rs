//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving one record per tool invocation
    pub invocation_log: Option<String>,
    /// Directory for daily-rotated diagnostic logs (stderr only when unset)
    pub directory: Option<String>,
}
