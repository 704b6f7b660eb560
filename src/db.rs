use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::config::{AdvisorConfig, EngineConfig};
use crate::store::{SqliteStore, StoreError};

pub type DbPool = SqlitePool;

/// Application state shared by every command
pub struct AppState {
  pub store: SqliteStore,
  pub engine: EngineConfig,
  pub config: AdvisorConfig,
}

impl AppState {
  pub fn new(pool: DbPool, config: AdvisorConfig) -> Self {
    Self {
      store: SqliteStore::new(pool),
      engine: EngineConfig::default(),
      config,
    }
  }

  /// Connect to the configured database and build the state around it
  pub async fn connect(config: AdvisorConfig) -> Result<Self, StoreError> {
    let pool = initialize_db(&config.database_url, config.max_connections).await?;
    Ok(Self::new(pool, config))
  }
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(database_url: &str, max_connections: u32) -> Result<DbPool, StoreError> {
  info!(database_url, "Initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(max_connections)
    .connect(database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized successfully");

  Ok(pool)
}
