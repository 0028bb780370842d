//! SQL engine port
//!
//! One trait over both database engines. Rows come back as JSON objects keyed
//! by column name, in column order, without further transformation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use workbench_domain::ToolError;

/// Supported database engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlEngineKind {
    Postgres,
    Mysql,
}

impl SqlEngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlEngineKind::Postgres => "postgres",
            SqlEngineKind::Mysql => "mysql",
        }
    }
}

impl std::fmt::Display for SqlEngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SqlEngineKind {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(SqlEngineKind::Postgres),
            "mysql" | "mariadb" => Ok(SqlEngineKind::Mysql),
            other => Err(DatabaseError::UnsupportedEngine(other.to_string())),
        }
    }
}

/// Result rows of one statement
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRows {
    pub row_count: usize,
    pub rows: Vec<Map<String, Value>>,
}

impl QueryRows {
    pub fn new(rows: Vec<Map<String, Value>>) -> Self {
        Self {
            row_count: rows.len(),
            rows,
        }
    }
}

/// Database failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DatabaseError {
    #[error("Unsupported database engine: {0}")]
    UnsupportedEngine(String),

    #[error("{0} support is not enabled in this build")]
    NotEnabled(SqlEngineKind),

    #[error("Failed to connect to {engine}: {message}")]
    Connection {
        engine: SqlEngineKind,
        message: String,
    },

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Cannot decode column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl From<DatabaseError> for ToolError {
    fn from(err: DatabaseError) -> Self {
        match &err {
            DatabaseError::UnsupportedEngine(_) | DatabaseError::NotEnabled(_) => {
                ToolError::invalid_argument(err.to_string())
            }
            DatabaseError::Connection { .. } => ToolError::network_failure(err.to_string()),
            DatabaseError::Query(_) => ToolError::execution_failed(err.to_string()),
            DatabaseError::Decode { .. } => ToolError::malformed_data(err.to_string()),
        }
    }
}

/// Port for one SQL engine
#[async_trait]
pub trait SqlEnginePort: Send + Sync {
    fn kind(&self) -> SqlEngineKind;

    /// Schema used by catalog lookups when the caller names none
    fn default_schema(&self) -> String;

    /// Execute `sql` with positional string parameters.
    ///
    /// Parameter placeholders follow the engine's syntax (`$1` / `?`).
    async fn query(&self, sql: &str, params: &[String]) -> Result<QueryRows, DatabaseError>;
}
