//! Process configuration from TOML (`[process]` section)

use serde::{Deserialize, Serialize};

/// Raw process-runner configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessConfig {
    /// Deadline for one external command, in milliseconds
    pub timeout_ms: u64,
    /// Default working directory for git/docker/npm commands
    pub working_dir: Option<String>,
}

impl Default for FileProcessConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            working_dir: None,
        }
    }
}
