//! MySQL engine over the blocking `mysql` client pool.

use async_trait::async_trait;
use mysql::consts::ColumnType;
use mysql::prelude::Queryable;
use mysql::{OptsBuilder, Params, Pool, PoolConstraints, PoolOpts, Row};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info};
use workbench_application::{DatabaseError, QueryRows, SqlEngineKind, SqlEnginePort};

use super::join_error;
use crate::config::ConnectionSettings;

/// Lazily pooled MySQL engine
pub struct MysqlEngine {
    settings: ConnectionSettings,
    pool: OnceCell<Pool>,
}

impl MysqlEngine {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            pool: OnceCell::new(),
        }
    }

    async fn pool(&self) -> Result<&Pool, DatabaseError> {
        self.pool
            .get_or_try_init(|| async {
                let settings = self.settings.clone();
                tokio::task::spawn_blocking(move || build_pool(&settings))
                    .await
                    .map_err(join_error)?
            })
            .await
    }
}

fn connection_error(message: impl ToString) -> DatabaseError {
    DatabaseError::Connection {
        engine: SqlEngineKind::Mysql,
        message: message.to_string(),
    }
}

fn build_pool(settings: &ConnectionSettings) -> Result<Pool, DatabaseError> {
    info!(
        host = %settings.host,
        port = settings.port,
        database = %settings.database,
        "Creating MySQL pool"
    );
    let max = settings.max_connections as usize;
    let mut opts = OptsBuilder::new()
        .ip_or_hostname(Some(settings.host.clone()))
        .tcp_port(settings.port)
        .user(Some(settings.user.clone()))
        .db_name(Some(settings.database.clone()))
        .tcp_connect_timeout(Some(settings.connect_timeout));
    if !settings.password.is_empty() {
        opts = opts.pass(Some(settings.password.clone()));
    }
    if let Some(constraints) = PoolConstraints::new(0, max) {
        opts = opts.pool_opts(PoolOpts::default().with_constraints(constraints));
    }
    Pool::new(opts).map_err(connection_error)
}

#[async_trait]
impl SqlEnginePort for MysqlEngine {
    fn kind(&self) -> SqlEngineKind {
        SqlEngineKind::Mysql
    }

    fn default_schema(&self) -> String {
        self.settings.database.clone()
    }

    async fn query(&self, sql: &str, params: &[String]) -> Result<QueryRows, DatabaseError> {
        let pool = self.pool().await?.clone();
        let sql = sql.to_string();
        let params = params.to_vec();
        debug!(sql = %sql, params = params.len(), "Executing MySQL query");

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get_conn().map_err(connection_error)?;
            let rows: Vec<Row> = if params.is_empty() {
                conn.query(sql.as_str())
            } else {
                let bound = params
                    .into_iter()
                    .map(|p| mysql::Value::Bytes(p.into_bytes()))
                    .collect();
                conn.exec(sql.as_str(), Params::Positional(bound))
            }
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
            Ok(QueryRows::new(rows.iter().map(row_to_json).collect()))
        })
        .await
        .map_err(join_error)?
    }
}

fn row_to_json(row: &Row) -> Map<String, Value> {
    row.columns_ref()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let value = row
                .as_ref(idx)
                .map(|raw| convert_value(raw, column.column_type()))
                .unwrap_or(Value::Null);
            (column.name_str().into_owned(), value)
        })
        .collect()
}

/// Convert one MySQL cell to JSON.
///
/// The text protocol returns every cell as bytes, so those are parsed
/// according to the column type. DECIMAL stays a string to keep precision.
fn convert_value(raw: &mysql::Value, column_type: ColumnType) -> Value {
    match raw {
        mysql::Value::NULL => Value::Null,
        mysql::Value::Int(n) => Value::from(*n),
        mysql::Value::UInt(n) => Value::from(*n),
        mysql::Value::Float(n) => Value::from(f64::from(*n)),
        mysql::Value::Double(n) => Value::from(*n),
        mysql::Value::Date(y, mo, d, h, mi, s, micros) => {
            if matches!(column_type, ColumnType::MYSQL_TYPE_DATE) {
                Value::String(format!("{:04}-{:02}-{:02}", y, mo, d))
            } else if *micros > 0 {
                Value::String(format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
                    y, mo, d, h, mi, s, micros
                ))
            } else {
                Value::String(format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    y, mo, d, h, mi, s
                ))
            }
        }
        mysql::Value::Time(negative, days, h, mi, s, _micros) => {
            let hours = u32::from(*h) + days * 24;
            let sign = if *negative { "-" } else { "" };
            Value::String(format!("{}{:02}:{:02}:{:02}", sign, hours, mi, s))
        }
        mysql::Value::Bytes(bytes) => parse_text_cell(bytes, column_type),
    }
}

fn parse_text_cell(bytes: &[u8], column_type: ColumnType) -> Value {
    let text = String::from_utf8_lossy(bytes);
    match column_type {
        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_YEAR => text
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| text.parse::<u64>().map(Value::from))
            .unwrap_or_else(|_| Value::String(text.into_owned())),
        ColumnType::MYSQL_TYPE_FLOAT | ColumnType::MYSQL_TYPE_DOUBLE => text
            .parse::<f64>()
            .ok()
            .and_then(|n| serde_json::Number::from_f64(n).map(Value::Number))
            .unwrap_or_else(|| Value::String(text.into_owned())),
        ColumnType::MYSQL_TYPE_JSON => {
            serde_json::from_slice(bytes).unwrap_or_else(|_| Value::String(text.into_owned()))
        }
        _ => Value::String(text.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_protocol_cells_follow_column_type() {
        assert_eq!(
            parse_text_cell(b"42", ColumnType::MYSQL_TYPE_LONG),
            json!(42)
        );
        assert_eq!(
            parse_text_cell(b"18446744073709551615", ColumnType::MYSQL_TYPE_LONGLONG),
            json!(18446744073709551615u64)
        );
        assert_eq!(
            parse_text_cell(b"1.5", ColumnType::MYSQL_TYPE_DOUBLE),
            json!(1.5)
        );
        assert_eq!(
            parse_text_cell(b"12.30", ColumnType::MYSQL_TYPE_NEWDECIMAL),
            json!("12.30")
        );
        assert_eq!(
            parse_text_cell(br#"{"a":1}"#, ColumnType::MYSQL_TYPE_JSON),
            json!({"a": 1})
        );
    }

    #[test]
    fn test_binary_protocol_values() {
        assert_eq!(
            convert_value(&mysql::Value::NULL, ColumnType::MYSQL_TYPE_LONG),
            Value::Null
        );
        assert_eq!(
            convert_value(
                &mysql::Value::Date(2024, 3, 9, 0, 0, 0, 0),
                ColumnType::MYSQL_TYPE_DATE
            ),
            json!("2024-03-09")
        );
        assert_eq!(
            convert_value(
                &mysql::Value::Date(2024, 3, 9, 14, 5, 7, 0),
                ColumnType::MYSQL_TYPE_DATETIME
            ),
            json!("2024-03-09 14:05:07")
        );
        assert_eq!(
            convert_value(
                &mysql::Value::Time(false, 1, 2, 3, 4, 0),
                ColumnType::MYSQL_TYPE_TIME
            ),
            json!("26:03:04")
        );
    }
}
