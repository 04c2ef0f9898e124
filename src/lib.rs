#![deny(warnings)]

// Re-export all public modules
pub mod backend;
pub mod config;
pub mod controllers;
pub mod manager;
pub mod metrics;
pub mod observability;
pub mod router;

// Testing utilities (always available for integration tests)
pub mod testing;

// Re-export commonly used types for convenience
pub use backend::{BackendError, PoolBackend, SeaOrmBackend};
pub use manager::{AcquireError, ConnectError, PoolManager, PoolState};
pub use metrics::AppMetrics;

/// Manager type used by the HTTP shell and the production binary.
pub type DatabaseManager = PoolManager<SeaOrmBackend>;
