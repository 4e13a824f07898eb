//! SQLite pool factory and migration runner.

use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Executor,
};

const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Schema change contributed by a module.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// Owned handle to the connection pool.
///
/// Cloning is cheap; every clone shares the same pool. Call [`Database::close`]
/// once at shutdown to release the connections.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool for `url`, creating the database file when missing.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url '{url}'"))?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);

        // Every connection to `:memory:` is a separate database, so keep exactly one alive.
        if is_in_memory(url) {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("failed to connect to '{url}'"))?;

        tracing::info!(target: "bookstore-db", %url, "database pool ready");

        Ok(Self { pool })
    }

    /// Private in-memory database, used by tests and throwaway runs.
    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::connect(IN_MEMORY_URL, 1).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply every migration whose `(module, id)` has not been recorded yet.
    ///
    /// Returns the number of migrations applied by this call.
    pub async fn apply_migrations(&self, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
        self.pool
            .execute(
                r#"
                CREATE TABLE IF NOT EXISTS _migrations (
                    module     TEXT NOT NULL,
                    id         TEXT NOT NULL,
                    applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    PRIMARY KEY (module, id)
                )
                "#,
            )
            .await
            .context("failed to create migration ledger")?;

        let mut applied = 0;

        for (module, migration) in migrations {
            let already_applied: Option<i64> =
                sqlx::query_scalar("SELECT 1 FROM _migrations WHERE module = ? AND id = ?")
                    .bind(module)
                    .bind(migration.id)
                    .fetch_optional(&self.pool)
                    .await
                    .context("failed to read migration ledger")?;

            if already_applied.is_some() {
                tracing::debug!(target: "bookstore-db", %module, id = migration.id, "migration already applied");
                continue;
            }

            let mut tx = self.pool.begin().await?;

            (&mut *tx)
                .execute(migration.up)
                .await
                .with_context(|| format!("migration '{}/{}' failed", module, migration.id))?;

            sqlx::query("INSERT INTO _migrations (module, id) VALUES (?, ?)")
                .bind(module)
                .bind(migration.id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;

            tracing::info!(target: "bookstore-db", %module, id = migration.id, "migration applied");
            applied += 1;
        }

        Ok(applied)
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(target: "bookstore-db", "database pool closed");
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
