use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::AppConfig;

pub type DbPool = SqlitePool;

/// Application state holding the database connection pool
pub struct AppState {
  pub db: DbPool,
  pub config: AppConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
  #[error("Failed to prepare database directory: {0}")]
  Io(#[from] std::io::Error),

  #[error("Database error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration failed: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(db_path: &Path) -> Result<DbPool, DbError> {
  if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)?;
  }

  let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

  info!("Initializing database at: {}", db_path.display());

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized successfully");

  Ok(pool)
}
