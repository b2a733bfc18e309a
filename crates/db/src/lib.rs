//! SQLite connection pool factory and module migration runner.

use std::str::FromStr;
use std::time::Duration;

use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::Migration;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration {id} failed: {message}")]
    Migration { id: String, message: String },
}

pub type Result<T> = std::result::Result<T, DbError>;

const LEDGER_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS _bookshelf_migrations (
        module     TEXT    NOT NULL,
        id         TEXT    NOT NULL,
        applied_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
        PRIMARY KEY (module, id)
    )
"#;

/// Create a configured SQLite connection pool and verify it answers queries.
pub async fn create_pool(settings: &DatabaseSettings) -> Result<SqlitePool> {
    tracing::info!(
        target: "bookshelf-db",
        url = %settings.url,
        min_connections = settings.min_connections,
        max_connections = settings.max_connections,
        "creating database connection pool"
    );

    let mut connect_options = SqliteConnectOptions::from_str(&settings.url)?
        .foreign_keys(true)
        .create_if_missing(true);

    let mut pool_options = SqlitePoolOptions::new()
        .min_connections(settings.min_connections)
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms));

    if settings.is_in_memory() {
        // Dropping the last connection drops the database with it.
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    } else {
        connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool = pool_options
        .connect_with(connect_options)
        .await
        .inspect_err(|e| tracing::warn!(target: "bookshelf-db", error = %e, "failed to create connection pool"))?;

    health_check(&pool).await?;

    Ok(pool)
}

/// Run a trivial query to confirm the pool is usable.
pub async fn health_check(pool: &SqlitePool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    tracing::debug!(target: "bookshelf-db", "database health check passed");
    Ok(())
}

/// Apply module migrations that are not yet recorded in the ledger.
///
/// Each migration runs in its own transaction together with its ledger row.
/// Returns the number of migrations applied by this call.
pub async fn run_migrations(pool: &SqlitePool, migrations: &[(String, Migration)]) -> Result<usize> {
    sqlx::raw_sql(LEDGER_DDL).execute(pool).await?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let already_applied: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM _bookshelf_migrations WHERE module = ? AND id = ?)",
        )
        .bind(module)
        .bind(migration.id)
        .fetch_one(pool)
        .await?;

        if already_applied {
            tracing::debug!(target: "bookshelf-db", module = %module, id = migration.id, "migration already applied");
            continue;
        }

        let qualified_id = format!("{}/{}", module, migration.id);
        let failed = |e: sqlx::Error| DbError::Migration {
            id: qualified_id.clone(),
            message: e.to_string(),
        };

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;
        sqlx::query("INSERT INTO _bookshelf_migrations (module, id) VALUES (?, ?)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;
        tx.commit().await.map_err(failed)?;

        tracing::info!(target: "bookshelf-db", id = %qualified_id, "applied migration");
        applied += 1;
    }

    Ok(applied)
}
