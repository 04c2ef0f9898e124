//! SeaORM-backed production backend

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::debug;

use super::{BackendError, PoolBackend};
use crate::config::DatabaseConfig;

/// Production backend connecting through SeaORM / sqlx
///
/// The driver stack exposes no push-style pool-error callback, so fatal
/// errors are detected by a periodic liveness watch: the first failed ping
/// on an established pool is reported as the fatal error.
#[derive(Debug, Clone)]
pub struct SeaOrmBackend {
    health_check_interval: Duration,
}

impl SeaOrmBackend {
    pub fn new(health_check_interval: Duration) -> Self {
        Self {
            health_check_interval,
        }
    }

    /// Backend configured from the database section.
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(Duration::from_secs(config.health_check_interval))
    }
}

#[async_trait]
impl PoolBackend for SeaOrmBackend {
    type Handle = Arc<DatabaseConnection>;

    async fn open(&self, config: &DatabaseConfig) -> Result<Self::Handle, BackendError> {
        let mut options = ConnectOptions::new(config.url());
        options
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .acquire_timeout(Duration::from_secs(config.acquire_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .sqlx_logging(false);

        let connection = Database::connect(options)
            .await
            .map_err(|err| BackendError::Open(err.to_string()))?;

        Ok(Arc::new(connection))
    }

    async fn probe(&self, handle: &Self::Handle) -> Result<(), BackendError> {
        handle
            .ping()
            .await
            .map_err(|err| BackendError::Probe(err.to_string()))
    }

    async fn close(&self, handle: Self::Handle) -> Result<(), BackendError> {
        handle
            .close_by_ref()
            .await
            .map_err(|err| BackendError::Close(err.to_string()))
    }

    async fn watch(&self, handle: &Self::Handle) -> BackendError {
        loop {
            tokio::time::sleep(self.health_check_interval).await;
            if let Err(err) = handle.ping().await {
                debug!(error = %err, "liveness watch detected a dead pool");
                return BackendError::Fatal(err.to_string());
            }
        }
    }
}
