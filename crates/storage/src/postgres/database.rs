//! Kennel's PostgreSQL pool and schema migrations.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, instrument};

use kennel_core::error::{StorageError, StorageResult};

/// Pool settings for the Kennel database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a resolver may wait for a free connection.
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl DatabaseConfig {
    /// General-purpose settings for `url`, suited to migrations and batch work.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 20,
            min_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }

    /// Settings for serving GraphQL traffic.
    ///
    /// Every connection field costs at most two short queries, so the pool
    /// stays small and a saturated pool surfaces as `STORAGE_UNAVAILABLE`
    /// within seconds.
    pub fn for_graphql(url: impl Into<String>) -> Self {
        Self {
            max_connections: 15,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(900),
            ..Self::new(url)
        }
    }
}

/// Shared handle to the Kennel pool. Cloning shares the pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    #[instrument(skip_all, fields(max = config.max_connections, min = config.min_connections))]
    pub async fn connect(config: &DatabaseConfig) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .max_lifetime(Some(config.max_lifetime))
            .connect(&config.url)
            .await
            .map_err(|e| StorageError::ConnectionError(e.to_string()))?;

        debug!(
            acquire_timeout_ms = config.acquire_timeout.as_millis() as u64,
            "Pool ready"
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the users, pets, tags and pet_tags schema.
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> StorageResult<()> {
        let migrator = sqlx::migrate!("./migrations");

        migrator
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::MigrationError(e.to_string()))?;

        info!(known = migrator.iter().count(), "Schema up to date");
        Ok(())
    }

    /// Round-trip a trivial query through the pool.
    pub async fn ping(&self) -> StorageResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| StorageError::ConnectionError(e.to_string()))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
