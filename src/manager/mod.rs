//! Resilient connection manager
//!
//! Owns the lifecycle of one pooled database connection handle: initial
//! acquisition with bounded retries and exponential backoff, liveness
//! verification before readiness, fail-fast borrowing for concurrent
//! callers, and automatic recovery when the backend reports a fatal error.

mod error;
mod pool;
mod state;

pub use error::{AcquireError, ConnectError};
pub use pool::PoolManager;
pub use state::PoolState;
