#![cfg(test)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use migration::MigratorTrait;
use models::db::{connect_with_config, in_memory_config};
use sea_orm::DatabaseConnection;

// Fresh in-memory database per test, schema migrated
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = connect_with_config(&in_memory_config()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

static FILE_SEQ: AtomicUsize = AtomicUsize::new(0);

/// File-backed SQLite with a real pool, for tests that need several connections.
/// The caller removes the returned path when done.
pub async fn get_pooled_db(connections: u32) -> Result<(DatabaseConnection, PathBuf), anyhow::Error> {
    let seq = FILE_SEQ.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!("catalog-test-{}-{seq}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let cfg = models::db::DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections: connections,
        min_connections: 1,
        ..in_memory_config()
    };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok((db, path))
}
