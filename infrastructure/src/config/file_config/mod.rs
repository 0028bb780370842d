//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types.

mod database;
mod http;
mod logging;
mod process;

pub use database::{ConnectionSettings, FileConnectionConfig, FileDatabaseConfig};
pub use http::FileHttpConfig;
pub use logging::FileLoggingConfig;
pub use process::FileProcessConfig;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use workbench_application::ExecutionParams;
use workbench_domain::ToolError;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// External command settings
    pub process: FileProcessConfig,
    /// HTTP probe settings
    pub http: FileHttpConfig,
    /// Database connection settings
    pub database: FileDatabaseConfig,
    /// Diagnostic and invocation logging
    pub logging: FileLoggingConfig,
}

/// How serious a configuration issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One problem found by [`FileConfig::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted path of the offending key
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.to_string(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Configuration that could not be loaded or used
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("Invalid configuration: {}", join_issues(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ConfigIssue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ConfigError> for ToolError {
    fn from(e: ConfigError) -> Self {
        ToolError::execution_failed(e.to_string())
    }
}

impl FileConfig {
    /// Fail on error-level issues, returning the remaining warnings.
    pub fn check(&self) -> Result<Vec<ConfigIssue>, ConfigError> {
        let (errors, warnings): (Vec<_>, Vec<_>) = self
            .validate()
            .into_iter()
            .partition(|issue| issue.severity == Severity::Error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.process.timeout_ms == 0 {
            issues.push(ConfigIssue::error("process.timeout_ms", "timeout cannot be 0"));
        }
        if let Some(dir) = &self.process.working_dir
            && !std::path::Path::new(dir).is_dir()
        {
            issues.push(ConfigIssue::warning(
                "process.working_dir",
                format!("'{}' is not a directory", dir),
            ));
        }

        if self.http.timeout_ms == 0 {
            issues.push(ConfigIssue::error("http.timeout_ms", "timeout cannot be 0"));
        }
        if self.http.max_requests == 0 {
            issues.push(ConfigIssue::error("http.max_requests", "must be at least 1"));
        }
        if self.http.default_requests > self.http.max_requests {
            issues.push(ConfigIssue::warning(
                "http.default_requests",
                format!(
                    "{} exceeds http.max_requests ({}); it will be capped",
                    self.http.default_requests, self.http.max_requests
                ),
            ));
        }

        for (field, conn) in [
            ("database.postgres.host", &self.database.postgres),
            ("database.mysql.host", &self.database.mysql),
        ] {
            if conn.host.trim().is_empty() {
                issues.push(ConfigIssue::error(field, "host cannot be empty"));
            }
        }

        issues
    }

    /// Handler limits derived from this configuration
    pub fn execution_params(&self) -> ExecutionParams {
        let mut params = ExecutionParams::default()
            .with_process_timeout(Duration::from_millis(self.process.timeout_ms))
            .with_http_timeout(Duration::from_millis(self.http.timeout_ms))
            .with_max_requests(self.http.max_requests.max(1));
        params.default_requests = self.http.default_requests.clamp(1, params.max_requests);
        if let Some(dir) = &self.process.working_dir {
            params = params.with_working_dir(dir.clone());
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[process]
timeout_ms = 5000
working_dir = "/tmp"

[http]
timeout_ms = 2000
user_agent = "probe/1.0"
max_requests = 50

[database.postgres]
host = "pg.internal"
port = 6543

[logging]
invocation_log = "/tmp/invocations.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.process.timeout_ms, 5000);
        assert_eq!(config.http.user_agent, "probe/1.0");
        assert_eq!(config.database.postgres.port, Some(6543));
        assert_eq!(
            config.logging.invocation_log.as_deref(),
            Some("/tmp/invocations.jsonl")
        );
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.process.timeout_ms, 30_000);
        assert_eq!(config.http.max_requests, 1000);
        assert!(config.logging.invocation_log.is_none());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_zero_timeouts_and_empty_hosts() {
        let mut config = FileConfig::default();
        config.process.timeout_ms = 0;
        config.http.timeout_ms = 0;
        config.database.mysql.host = " ".to_string();

        let fields: Vec<String> = config.validate().into_iter().map(|i| i.field).collect();
        assert_eq!(
            fields,
            vec!["process.timeout_ms", "http.timeout_ms", "database.mysql.host"]
        );
    }

    #[test]
    fn test_check_separates_errors_from_warnings() {
        let mut config = FileConfig::default();
        config.http.default_requests = config.http.max_requests + 1;
        let warnings = config.check().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].severity, Severity::Warning);

        config.process.timeout_ms = 0;
        let err = config.check().unwrap_err();
        assert!(err.to_string().contains("process.timeout_ms: timeout cannot be 0"));
        assert!(matches!(err, ConfigError::Invalid(ref issues) if issues.len() == 1));
    }

    #[test]
    fn test_execution_params() {
        let config: FileConfig = toml::from_str(
            r#"
[process]
timeout_ms = 1500
working_dir = "/srv/app"

[http]
max_requests = 5
default_requests = 20
"#,
        )
        .unwrap();
        let params = config.execution_params();
        assert_eq!(params.process_timeout, Duration::from_millis(1500));
        assert_eq!(params.working_dir.as_deref(), Some("/srv/app"));
        assert_eq!(params.max_requests, 5);
        assert_eq!(params.default_requests, 5);
    }
}
