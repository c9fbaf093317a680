use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use datatable_db::{ConnectOpts, DbEngine};
use runtime::DatabaseConfig;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::users::schema;

pub const MOCK_DSN: &str = "sqlite::memory:";

/// Rewrite a relative `sqlite://` path so it lives under `base_dir`.
/// In-memory and URI-style DSNs pass through untouched.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    if datatable_db::is_memory_dsn(dsn) {
        return Ok(dsn.to_string());
    }
    let Some(db_path) = dsn.strip_prefix("sqlite://") else {
        return Ok(dsn.to_string());
    };

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };
    if path_str.is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }

    let mut p = PathBuf::from(path_str);
    if p.is_relative() {
        p = base_dir.join(p);
    }

    let mut out = format!("sqlite://{}", p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Connect to the configured database (or an in-memory one when `mock`),
/// then install and seed the demo schema.
pub async fn open(
    cfg: Option<&DatabaseConfig>,
    home_dir: &Path,
    mock: bool,
) -> Result<DatabaseConnection> {
    let (dsn, opts) = match (mock, cfg) {
        (true, _) => (MOCK_DSN.to_string(), ConnectOpts::default()),
        (false, Some(cfg)) => {
            let url = cfg.url.trim();
            if url.is_empty() {
                return Err(anyhow!("Database URL not configured"));
            }
            let dsn = match datatable_db::detect(url)? {
                DbEngine::Sqlite => absolutize_sqlite_dsn(url, home_dir)?,
                DbEngine::Postgres => url.to_string(),
            };
            let mut opts = ConnectOpts {
                max_conns: cfg.max_conns,
                acquire_timeout: Some(Duration::from_secs(5)),
                ..ConnectOpts::default()
            };
            if let Some(ms) = cfg.busy_timeout_ms {
                opts.busy_timeout = Some(Duration::from_millis(ms));
            }
            (dsn, opts)
        }
        (false, None) => {
            return Err(anyhow!(
                "No database configured; set `database.url` or pass --mock"
            ))
        }
    };

    info!(mock, "connecting to database");
    let conn = datatable_db::connect(&dsn, opts)
        .await
        .context("Failed to connect to database")?;

    schema::install(&conn)
        .await
        .context("Failed to create users table")?;
    schema::seed(&conn).await.context("Failed to seed users")?;
    Ok(conn)
}
