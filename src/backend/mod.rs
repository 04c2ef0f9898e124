//! Driver-facing abstraction for the connection manager
//!
//! The manager treats the database driver as a black box with four
//! capabilities: opening a pool may fail, the liveness probe may fail
//! independently of opening, closing may fail but must never prevent state
//! cleanup, and an established pool may report a fatal error at any time.

mod sea_orm_backend;

pub use sea_orm_backend::SeaOrmBackend;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::DatabaseConfig;

/// Errors reported by a pool backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// Pool creation failed
    #[error("failed to open connection pool: {0}")]
    Open(String),
    /// The liveness probe round-trip failed
    #[error("liveness probe failed: {0}")]
    Probe(String),
    /// Closing a pool handle failed
    #[error("failed to close connection pool: {0}")]
    Close(String),
    /// The driver reported a fatal runtime failure on an established pool
    #[error("fatal pool error: {0}")]
    Fatal(String),
}

/// Contract between the connection manager and the underlying driver
#[async_trait]
pub trait PoolBackend: Send + Sync + 'static {
    /// Opaque pooled-connection handle; clones share the same pool.
    type Handle: Clone + Send + Sync + 'static;

    /// Open a new pool against the configured target.
    async fn open(&self, config: &DatabaseConfig) -> Result<Self::Handle, BackendError>;

    /// Run a trivial round-trip query to confirm the pool can serve requests.
    async fn probe(&self, handle: &Self::Handle) -> Result<(), BackendError>;

    /// Close the pool. Failure is reported but the handle is discarded
    /// by the caller regardless.
    async fn close(&self, handle: Self::Handle) -> Result<(), BackendError>;

    /// Resolve when the driver reports a fatal error on an established pool.
    ///
    /// The future is awaited by a background task for as long as the handle
    /// stays installed; it is dropped when the handle is replaced or the
    /// manager is closed.
    async fn watch(&self, handle: &Self::Handle) -> BackendError;
}
