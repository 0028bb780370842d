//! database server: verbatim SQL plus catalog lookups
//!
//! `db_query` executes the caller's SQL as given. Catalog lookups bind the
//! schema and table names as parameters.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use workbench_application::{SqlEngineKind, SqlEnginePort};
use workbench_domain::{
    RiskLevel, ToolCall, ToolDefinition, ToolError, ToolOutput, ToolParameter,
    tool::provider::{ProviderError, ToolProvider},
};

use super::{parse_args, unknown};
use crate::database::SqlEngines;

pub const DB_QUERY: &str = "db_query";
pub const DB_LIST_TABLES: &str = "db_list_tables";
pub const DB_DESCRIBE_TABLE: &str = "db_describe_table";

const PG_LIST_TABLES: &str = "SELECT table_name::text AS table_name, table_type::text AS table_type \
     FROM information_schema.tables \
     WHERE table_schema = $1::text \
     ORDER BY table_name";

const PG_DESCRIBE_TABLE: &str = "SELECT column_name::text AS column_name, data_type::text AS data_type, \
     is_nullable::text AS is_nullable, column_default::text AS column_default \
     FROM information_schema.columns \
     WHERE table_schema = $1::text AND table_name = $2::text \
     ORDER BY ordinal_position";

const MYSQL_LIST_TABLES: &str = "SELECT TABLE_NAME AS table_name, TABLE_TYPE AS table_type \
     FROM information_schema.tables \
     WHERE table_schema = ? \
     ORDER BY TABLE_NAME";

const MYSQL_DESCRIBE_TABLE: &str = "SELECT COLUMN_NAME AS column_name, DATA_TYPE AS data_type, \
     IS_NULLABLE AS is_nullable, COLUMN_DEFAULT AS column_default \
     FROM information_schema.columns \
     WHERE table_schema = ? AND table_name = ? \
     ORDER BY ORDINAL_POSITION";

fn engine_parameter() -> ToolParameter {
    ToolParameter::new("engine", "Database engine: postgres or mysql", true)
}

fn schema_parameter() -> ToolParameter {
    ToolParameter::new(
        "schema",
        "Schema name (default: public for postgres, the configured database for mysql)",
        false,
    )
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            DB_QUERY,
            "Execute SQL and return the rows as JSON objects",
            RiskLevel::High,
        )
        .with_parameter(engine_parameter())
        .with_parameter(ToolParameter::new("sql", "SQL statement, executed verbatim", true)),
        ToolDefinition::new(DB_LIST_TABLES, "List tables in a schema", RiskLevel::Low)
            .with_parameter(engine_parameter())
            .with_parameter(schema_parameter()),
        ToolDefinition::new(
            DB_DESCRIBE_TABLE,
            "Describe the columns of a table",
            RiskLevel::Low,
        )
        .with_parameter(engine_parameter())
        .with_parameter(ToolParameter::new("table", "Table name", true))
        .with_parameter(schema_parameter()),
    ]
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    engine: String,
    sql: String,
}

#[derive(Debug, Deserialize)]
struct ListTablesArgs {
    engine: String,
    schema: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DescribeTableArgs {
    engine: String,
    table: String,
    schema: Option<String>,
}

/// Provider for the database server
pub struct DatabaseProvider {
    engines: SqlEngines,
}

impl DatabaseProvider {
    pub fn new(engines: SqlEngines) -> Self {
        Self { engines }
    }

    fn engine(&self, name: &str) -> Result<std::sync::Arc<dyn SqlEnginePort>, ToolError> {
        let kind: SqlEngineKind = name.parse()?;
        Ok(self.engines.get(kind)?)
    }

    async fn query(&self, args: QueryArgs) -> Result<ToolOutput, ToolError> {
        if args.sql.trim().is_empty() {
            return Err(ToolError::invalid_argument("sql cannot be empty"));
        }
        let engine = self.engine(&args.engine)?;
        debug!(engine = %engine.kind(), "Executing query");
        let rows = engine.query(&args.sql, &[]).await?;
        ToolOutput::json(&rows)
    }

    async fn list_tables(&self, args: ListTablesArgs) -> Result<ToolOutput, ToolError> {
        let engine = self.engine(&args.engine)?;
        let schema = args.schema.unwrap_or_else(|| engine.default_schema());
        let sql = match engine.kind() {
            SqlEngineKind::Postgres => PG_LIST_TABLES,
            SqlEngineKind::Mysql => MYSQL_LIST_TABLES,
        };
        let rows = engine.query(sql, &[schema]).await?;
        ToolOutput::json(&rows)
    }

    async fn describe_table(&self, args: DescribeTableArgs) -> Result<ToolOutput, ToolError> {
        let engine = self.engine(&args.engine)?;
        let schema = args.schema.unwrap_or_else(|| engine.default_schema());
        let sql = match engine.kind() {
            SqlEngineKind::Postgres => PG_DESCRIBE_TABLE,
            SqlEngineKind::Mysql => MYSQL_DESCRIBE_TABLE,
        };
        let rows = engine.query(sql, &[schema.clone(), args.table.clone()]).await?;
        if rows.row_count == 0 {
            return Err(ToolError::invalid_argument(format!(
                "Table '{}' not found in schema '{}'",
                args.table, schema
            )));
        }
        ToolOutput::json(&rows)
    }
}

#[async_trait]
impl ToolProvider for DatabaseProvider {
    fn id(&self) -> &str {
        "database"
    }

    fn display_name(&self) -> &str {
        "Database"
    }

    async fn is_available(&self) -> bool {
        !self.engines.is_empty()
    }

    async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
        Ok(definitions())
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        match call.tool_name.as_str() {
            DB_QUERY => self.query(parse_args(call)?).await,
            DB_LIST_TABLES => self.list_tables(parse_args(call)?).await,
            DB_DESCRIBE_TABLE => self.describe_table(parse_args(call)?).await,
            _ => Err(unknown(call)),
        }
    }
}
