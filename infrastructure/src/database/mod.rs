//! SQL engine adapters
//!
//! Each engine owns a connection pool created lazily on first use behind a
//! `tokio::sync::OnceCell` and kept for the life of the process. Failed
//! initialization is not cached; the next call tries again.
//!
//! | Engine | Feature | Crates |
//! |--------|---------|--------|
//! | PostgreSQL | `postgres` | `postgres`, `r2d2`, `r2d2_postgres` |
//! | MySQL | `mysql` | `mysql` |

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgres")]
pub mod postgres;

use std::collections::HashMap;
use std::sync::Arc;
use workbench_application::{DatabaseError, SqlEngineKind, SqlEnginePort};

use crate::config::FileDatabaseConfig;

/// The engines available to the database server, keyed by kind
#[derive(Clone, Default)]
pub struct SqlEngines {
    engines: HashMap<SqlEngineKind, Arc<dyn SqlEnginePort>>,
}

impl SqlEngines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(mut self, engine: Arc<dyn SqlEnginePort>) -> Self {
        self.engines.insert(engine.kind(), engine);
        self
    }

    /// Engines compiled into this build, configured from `config`
    #[allow(unused_mut, unused_variables)]
    pub fn from_config(config: &FileDatabaseConfig) -> Self {
        let mut engines = Self::new();
        #[cfg(feature = "postgres")]
        {
            engines = engines.with_engine(Arc::new(postgres::PostgresEngine::new(
                config.postgres.resolve(SqlEngineKind::Postgres),
            )));
        }
        #[cfg(feature = "mysql")]
        {
            engines = engines.with_engine(Arc::new(mysql::MysqlEngine::new(
                config.mysql.resolve(SqlEngineKind::Mysql),
            )));
        }
        engines
    }

    pub fn get(&self, kind: SqlEngineKind) -> Result<Arc<dyn SqlEnginePort>, DatabaseError> {
        self.engines
            .get(&kind)
            .cloned()
            .ok_or(DatabaseError::NotEnabled(kind))
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

/// Map a `spawn_blocking` join failure into a query error
pub(crate) fn join_error(err: tokio::task::JoinError) -> DatabaseError {
    DatabaseError::Query(format!("database worker failed: {}", err))
}
