//! Database configuration from TOML (`[database.postgres]`, `[database.mysql]`)
//!
//! The same fields can come from `POSTGRES_*` / `MYSQL_*` environment
//! variables; see [`ConfigLoader`](crate::config::ConfigLoader). Unset
//! port, database and user fall back to per-engine defaults when resolved.

use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use workbench_application::SqlEngineKind;

/// Raw connection settings for one engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConnectionConfig {
    #[serde(deserialize_with = "lenient_string")]
    pub host: String,
    pub port: Option<u16>,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub database: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub user: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub password: String,
    /// Pool size (default: 4)
    pub max_connections: u32,
    /// Connect deadline in milliseconds (default: 10000)
    pub connect_timeout_ms: u64,
}

impl Default for FileConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            database: None,
            user: None,
            password: String::new(),
            max_connections: 4,
            connect_timeout_ms: 10_000,
        }
    }
}

impl FileConnectionConfig {
    /// Fill engine defaults into a ready-to-use settings record
    pub fn resolve(&self, kind: SqlEngineKind) -> ConnectionSettings {
        let (port, database, user) = match kind {
            SqlEngineKind::Postgres => (5432, "postgres", "postgres"),
            SqlEngineKind::Mysql => (3306, "mysql", "root"),
        };
        ConnectionSettings {
            host: self.host.clone(),
            port: self.port.unwrap_or(port),
            database: self.database.clone().unwrap_or_else(|| database.to_string()),
            user: self.user.clone().unwrap_or_else(|| user.to_string()),
            password: self.password.clone(),
            max_connections: self.max_connections.max(1),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
        }
    }
}

/// Resolved connection settings handed to an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

/// Raw database configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDatabaseConfig {
    pub postgres: FileConnectionConfig,
    pub mysql: FileConnectionConfig,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientString {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl From<LenientString> for String {
    fn from(raw: LenientString) -> Self {
        match raw {
            LenientString::Str(s) => s,
            LenientString::Int(n) => n.to_string(),
            LenientString::UInt(n) => n.to_string(),
            LenientString::Float(n) => n.to_string(),
            LenientString::Bool(b) => b.to_string(),
        }
    }
}

/// Accept numbers and booleans where a string is expected.
///
/// Environment values such as `POSTGRES_PASSWORD=1234` arrive typed.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    LenientString::deserialize(deserializer).map(String::from)
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<LenientString>::deserialize(deserializer).map(|raw| raw.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults() {
        let config = FileDatabaseConfig::default();
        let pg = config.postgres.resolve(SqlEngineKind::Postgres);
        assert_eq!(pg.port, 5432);
        assert_eq!(pg.database, "postgres");

        let my = config.mysql.resolve(SqlEngineKind::Mysql);
        assert_eq!(my.port, 3306);
        assert_eq!(my.user, "root");
        assert_eq!(my.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_partial_section_keeps_engine_defaults() {
        let config: FileDatabaseConfig = toml::from_str(
            r#"
[mysql]
host = "db.internal"
database = "shop"
password = 1234
"#,
        )
        .unwrap();
        let my = config.mysql.resolve(SqlEngineKind::Mysql);
        assert_eq!(my.host, "db.internal");
        assert_eq!(my.database, "shop");
        assert_eq!(my.password, "1234");
        assert_eq!(my.port, 3306);
        assert_eq!(config.postgres.resolve(SqlEngineKind::Postgres).port, 5432);
    }
}
