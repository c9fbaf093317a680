//! DSN to SeaORM connection, through an sqlx pool tuned per engine.

#![cfg_attr(
    not(all(feature = "pg", feature = "sqlite")),
    allow(unused_imports, unused_variables)
)]

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use tracing::{debug, info};

use crate::error::{DbError, Result};

#[cfg(feature = "pg")]
use sea_orm::SqlxPostgresConnector;
#[cfg(feature = "sqlite")]
use sea_orm::SqlxSqliteConnector;
#[cfg(feature = "pg")]
use sqlx::postgres::PgPoolOptions;
#[cfg(feature = "sqlite")]
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

const DEFAULT_SQLITE_BUSY_TIMEOUT_MS: u64 = 5000;

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

/// Pool knobs; each driver applies the subset it supports.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    pub acquire_timeout: Option<Duration>,
    /// SQLite only.
    pub busy_timeout: Option<Duration>,
    /// For SQLite file DSNs, create the file and its parent directories if missing.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            busy_timeout: Some(Duration::from_millis(DEFAULT_SQLITE_BUSY_TIMEOUT_MS)),
            create_sqlite_dirs: true,
        }
    }
}

/// Detect engine by DSN scheme.
pub fn detect(dsn: &str) -> Result<DbEngine> {
    let s = dsn.trim_start();
    if s.starts_with("postgres://") || s.starts_with("postgresql://") {
        Ok(DbEngine::Postgres)
    } else if s.starts_with("sqlite:") {
        Ok(DbEngine::Sqlite)
    } else {
        Err(DbError::UnknownDsn(dsn.to_string()))
    }
}

pub fn is_memory_dsn(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

/// Open a pool for `dsn` and wrap it in a SeaORM connection.
pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<DatabaseConnection> {
    match detect(dsn)? {
        DbEngine::Postgres => connect_pg(dsn, &opts).await,
        DbEngine::Sqlite => connect_sqlite(dsn, &opts).await,
    }
}

#[cfg(feature = "pg")]
async fn connect_pg(dsn: &str, opts: &ConnectOpts) -> Result<DatabaseConnection> {
    let mut o = PgPoolOptions::new();
    if let Some(n) = opts.max_conns {
        o = o.max_connections(n);
    }
    if let Some(n) = opts.min_conns {
        o = o.min_connections(n);
    }
    if let Some(t) = opts.acquire_timeout {
        o = o.acquire_timeout(t);
    }
    let pool = o.connect(dsn).await?;
    info!("connected to postgres");
    Ok(SqlxPostgresConnector::from_sqlx_postgres_pool(pool))
}

#[cfg(not(feature = "pg"))]
async fn connect_pg(_dsn: &str, _opts: &ConnectOpts) -> Result<DatabaseConnection> {
    Err(DbError::FeatureDisabled("pg"))
}

#[cfg(feature = "sqlite")]
async fn connect_sqlite(dsn: &str, opts: &ConnectOpts) -> Result<DatabaseConnection> {
    let memory = is_memory_dsn(dsn);
    if opts.create_sqlite_dirs && !memory {
        create_parent_dir(dsn)?;
    }

    let mut co = SqliteConnectOptions::from_str(dsn)?.create_if_missing(!memory);
    if let Some(t) = opts.busy_timeout {
        co = co.busy_timeout(t);
    }

    let mut o = SqlitePoolOptions::new();
    if memory {
        // Every connection to :memory: is a separate database; keep exactly one alive.
        o = o
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    } else {
        if let Some(n) = opts.max_conns {
            o = o.max_connections(n);
        }
        if let Some(n) = opts.min_conns {
            o = o.min_connections(n);
        }
    }
    if let Some(t) = opts.acquire_timeout {
        o = o.acquire_timeout(t);
    }

    let pool = o.connect_with(co).await?;
    info!(memory, "connected to sqlite");
    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

#[cfg(not(feature = "sqlite"))]
async fn connect_sqlite(_dsn: &str, _opts: &ConnectOpts) -> Result<DatabaseConnection> {
    Err(DbError::FeatureDisabled("sqlite"))
}

/// Handles `sqlite:/path`, `sqlite://path` and `sqlite:path`; URI forms
/// (`sqlite:file:...`) and DSNs with query strings are left alone.
fn create_parent_dir(dsn: &str) -> Result<()> {
    let raw = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .unwrap_or(dsn);
    if raw.starts_with("file:") || raw.contains('?') {
        return Ok(());
    }
    if let Some(parent) = Path::new(raw).parent() {
        if !parent.as_os_str().is_empty() {
            debug!(dir = %parent.display(), "creating sqlite directory");
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
