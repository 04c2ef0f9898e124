use thiserror::Error;

/// Errors from establishing or re-establishing the pool
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Every attempt of a connect cycle failed
    #[error("maximum connection attempts ({attempts}) exceeded")]
    MaxAttemptsExceeded {
        /// Number of attempts made before giving up
        attempts: u32,
    },
    /// The manager was shut down before or during the connect cycle
    #[error("connection manager is closed")]
    Closed,
}

/// Error returned to callers borrowing the pool
///
/// Callers must treat this as a service-unavailable condition and fail the
/// request; recovery happens out-of-band and is never waited on.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// No verified pool is currently installed
    #[error("database pool is not ready")]
    NotReady,
}
