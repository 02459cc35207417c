//! SQLite pool construction and schema bootstrap.

use anyhow::{Context, Result};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{path::Path, str::FromStr, time::Duration};

/// Schema applied on every start. Statements are idempotent.
const INIT_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Open a pool for `database_url`, creating the database file (and its parent
/// directory) when it does not exist yet.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    tracing::debug!("Connecting using raw URL => {}", database_url);

    if let Some(parent) = file_parent(database_url) {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating database directory {}", parent.display()))?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("parsing database URL `{}`", database_url))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("connecting to {}", database_url))
}

/// Private in-memory database on a single long-lived connection.
///
/// Each SQLite memory connection is its own database, so the pool must never
/// open a second one or recycle the first.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect("sqlite::memory:")
        .await
        .context("opening in-memory database")?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Apply the embedded schema one statement at a time.
pub async fn run_migrations(db: &SqlitePool) -> Result<()> {
    let statements = INIT_SQL
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt)
            .execute(db)
            .await
            .context("applying schema")?;
    }

    Ok(())
}

/// Local file path behind a `sqlite:` URL, if it names one.
fn file_parent(database_url: &str) -> Option<&Path> {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_parent_handles_common_url_shapes() {
        assert_eq!(
            file_parent("sqlite://./data/vehicles.db"),
            Some(Path::new("./data"))
        );
        assert_eq!(
            file_parent("sqlite:/var/lib/app/v.db?mode=rwc"),
            Some(Path::new("/var/lib/app"))
        );
        assert_eq!(file_parent("sqlite::memory:"), None);
        assert_eq!(file_parent("sqlite://vehicles.db"), None);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();

        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table'")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(tables, vec!["vehicles".to_string()]);
    }

    #[tokio::test]
    async fn schema_rejects_short_vins() {
        let pool = connect_in_memory().await.unwrap();
        let result = sqlx::query(
            "INSERT INTO vehicles VALUES ('SHORT', 'm', 'd', 1, 'n', 2000, 1.0, 'f', 'c', 'k')",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn connect_creates_file_and_parent_directory() {
        let dir = std::env::temp_dir().join(format!("vehicle-store-test-{}", std::process::id()));
        let db_path = dir.join("nested").join("vehicles.db");
        let url = format!("sqlite://{}", db_path.display());

        let pool = connect(&url, 1).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool.close().await;

        assert!(db_path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
