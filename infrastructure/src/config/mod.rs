//! Configuration file loading for workbench-mcp
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `WORKBENCH_*` (`__` nests), `POSTGRES_*`, `MYSQL_*`
//! 2. `--config <path>` specified file
//! 3. Project root: `./workbench.toml` or `./.workbench.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/workbench-mcp/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigError, ConfigIssue, ConnectionSettings, FileConfig, FileConnectionConfig, FileDatabaseConfig,
    FileHttpConfig, FileLoggingConfig, FileProcessConfig, Severity,
};
pub use loader::ConfigLoader;
