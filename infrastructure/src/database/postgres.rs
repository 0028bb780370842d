//! PostgreSQL engine over an `r2d2` pool of blocking `postgres` clients.

use async_trait::async_trait;
use postgres::NoTls;
use postgres::types::{FromSql, Kind, ToSql, Type};
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;
use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info};
use workbench_application::{DatabaseError, QueryRows, SqlEngineKind, SqlEnginePort};

use super::join_error;
use crate::config::ConnectionSettings;

type PgPool = Pool<PostgresConnectionManager<NoTls>>;

/// Lazily pooled PostgreSQL engine
pub struct PostgresEngine {
    settings: ConnectionSettings,
    pool: OnceCell<PgPool>,
}

impl PostgresEngine {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            pool: OnceCell::new(),
        }
    }

    async fn pool(&self) -> Result<&PgPool, DatabaseError> {
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
        engine: SqlEngineKind::Postgres,
        message: message.to_string(),
    }
}

fn build_pool(settings: &ConnectionSettings) -> Result<PgPool, DatabaseError> {
    info!(
        host = %settings.host,
        port = settings.port,
        database = %settings.database,
        "Creating PostgreSQL pool"
    );
    let mut config = postgres::Config::new();
    config
        .host(&settings.host)
        .port(settings.port)
        .dbname(&settings.database)
        .user(&settings.user)
        .connect_timeout(settings.connect_timeout);
    if !settings.password.is_empty() {
        config.password(&settings.password);
    }

    let manager = PostgresConnectionManager::new(config, NoTls);
    Pool::builder()
        .max_size(settings.max_connections)
        .connection_timeout(settings.connect_timeout)
        .build(manager)
        .map_err(connection_error)
}

#[async_trait]
impl SqlEnginePort for PostgresEngine {
    fn kind(&self) -> SqlEngineKind {
        SqlEngineKind::Postgres
    }

    fn default_schema(&self) -> String {
        "public".to_string()
    }

    async fn query(&self, sql: &str, params: &[String]) -> Result<QueryRows, DatabaseError> {
        let pool = self.pool().await?.clone();
        let sql = sql.to_string();
        let params = params.to_vec();
        debug!(sql = %sql, params = params.len(), "Executing PostgreSQL query");

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(connection_error)?;
            let bound: Vec<&(dyn ToSql + Sync)> =
                params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
            let rows = conn
                .query(sql.as_str(), &bound)
                .map_err(|e| DatabaseError::Query(e.to_string()))?;
            rows.iter()
                .map(row_to_json)
                .collect::<Result<Vec<_>, _>>()
                .map(QueryRows::new)
        })
        .await
        .map_err(join_error)?
    }
}

fn row_to_json(row: &postgres::Row) -> Result<Map<String, Value>, DatabaseError> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let value = column_value(row, idx, column.type_()).map_err(|e| DatabaseError::Decode {
                column: column.name().to_string(),
                message: e.to_string(),
            })?;
            Ok((column.name().to_string(), value))
        })
        .collect()
}

type DecodeError = Box<dyn std::error::Error + Send + Sync>;

/// Decode one column into JSON by its declared type.
///
/// Types without a native mapping go through [`decode_raw`]; a type it
/// cannot represent is a decode error, never a silent `null`.
fn column_value(row: &postgres::Row, idx: usize, ty: &Type) -> Result<Value, DecodeError> {
    fn json<T: Into<Value>>(value: Option<T>) -> Value {
        value.map(Into::into).unwrap_or(Value::Null)
    }

    let value = if *ty == Type::BOOL {
        json(row.try_get::<_, Option<bool>>(idx)?)
    } else if *ty == Type::INT2 {
        json(row.try_get::<_, Option<i16>>(idx)?)
    } else if *ty == Type::INT4 {
        json(row.try_get::<_, Option<i32>>(idx)?)
    } else if *ty == Type::INT8 {
        json(row.try_get::<_, Option<i64>>(idx)?)
    } else if *ty == Type::OID {
        json(row.try_get::<_, Option<u32>>(idx)?)
    } else if *ty == Type::FLOAT4 {
        json(row.try_get::<_, Option<f32>>(idx)?.map(f64::from))
    } else if *ty == Type::FLOAT8 {
        json(row.try_get::<_, Option<f64>>(idx)?)
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        row.try_get::<_, Option<Value>>(idx)?.unwrap_or(Value::Null)
    } else if *ty == Type::TIMESTAMPTZ {
        json(
            row.try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)?
                .map(|t| t.to_rfc3339()),
        )
    } else if *ty == Type::TIMESTAMP {
        json(
            row.try_get::<_, Option<chrono::NaiveDateTime>>(idx)?
                .map(|t| t.to_string()),
        )
    } else if *ty == Type::DATE {
        json(
            row.try_get::<_, Option<chrono::NaiveDate>>(idx)?
                .map(|d| d.to_string()),
        )
    } else if *ty == Type::TIME {
        json(
            row.try_get::<_, Option<chrono::NaiveTime>>(idx)?
                .map(|t| t.to_string()),
        )
    } else {
        match row.try_get::<_, Option<RawCell<'_>>>(idx)? {
            Some(RawCell(raw)) => decode_raw(ty, raw)?,
            None => Value::Null,
        }
    };
    Ok(value)
}

/// Undecoded binary cell of any type
struct RawCell<'a>(&'a [u8]);

impl<'a> FromSql<'a> for RawCell<'a> {
    fn from_sql(_: &Type, raw: &'a [u8]) -> Result<Self, DecodeError> {
        Ok(RawCell(raw))
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

/// Decode a binary-format cell for types the `postgres` crate has no
/// plain Rust mapping for here.
///
/// NUMERIC is rendered as a decimal string so no precision is lost.
fn decode_raw(ty: &Type, raw: &[u8]) -> Result<Value, String> {
    let is_text = [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME, Type::UNKNOWN, Type::XML]
        .contains(ty)
        || matches!(ty.kind(), Kind::Enum(_))
        || ty.name() == "citext";

    if is_text {
        std::str::from_utf8(raw)
            .map(|s| Value::String(s.to_string()))
            .map_err(|e| e.to_string())
    } else if *ty == Type::NUMERIC {
        decode_numeric(raw).map(Value::String)
    } else if *ty == Type::UUID {
        decode_uuid(raw).map(Value::String)
    } else if *ty == Type::BYTEA {
        let hex: String = raw.iter().map(|b| format!("{:02x}", b)).collect();
        Ok(Value::String(format!("\\x{}", hex)))
    } else {
        Err(format!(
            "unsupported column type `{}`; cast it to text in the query",
            ty.name()
        ))
    }
}

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// NUMERIC wire format: ndigits, weight, sign, dscale, then base-10000 digits
fn decode_numeric(raw: &[u8]) -> Result<String, String> {
    let word = |i: usize| {
        raw.get(2 * i..2 * i + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or_else(|| "truncated numeric value".to_string())
    };

    let ndigits = usize::from(word(0)?);
    let weight = i32::from(word(1)? as i16);
    let sign = word(2)?;
    let dscale = usize::from(word(3)?);

    match sign {
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        NUMERIC_POS | NUMERIC_NEG => {}
        other => return Err(format!("invalid numeric sign 0x{:04x}", other)),
    }

    let digits = (0..ndigits)
        .map(|i| word(4 + i))
        .collect::<Result<Vec<_>, _>>()?;
    let digit = |idx: i32| {
        usize::try_from(idx)
            .ok()
            .and_then(|i| digits.get(i).copied())
            .unwrap_or(0)
    };

    let mut text = String::new();
    if sign == NUMERIC_NEG {
        text.push('-');
    }
    if weight < 0 {
        text.push('0');
    } else {
        text.push_str(&digit(0).to_string());
        for idx in 1..=weight {
            text.push_str(&format!("{:04}", digit(idx)));
        }
    }

    if dscale > 0 {
        let mut fraction = String::new();
        let mut idx = weight + 1;
        while fraction.len() < dscale {
            fraction.push_str(&format!("{:04}", digit(idx)));
            idx += 1;
        }
        fraction.truncate(dscale);
        text.push('.');
        text.push_str(&fraction);
    }
    Ok(text)
}

fn decode_uuid(raw: &[u8]) -> Result<String, String> {
    if raw.len() != 16 {
        return Err(format!("uuid must be 16 bytes, got {}", raw.len()));
    }
    let hex: Vec<String> = raw.iter().map(|b| format!("{:02x}", b)).collect();
    Ok(format!(
        "{}-{}-{}-{}-{}",
        hex[0..4].concat(),
        hex[4..6].concat(),
        hex[6..8].concat(),
        hex[8..10].concat(),
        hex[10..16].concat()
    ))
}
