//! Connection manager core
//!
//! One `PoolManager` instance owns one logical database target for the
//! lifetime of the process. Many request-handling tasks read readiness and
//! borrow the pool concurrently while at most one connect cycle runs; a
//! caller is never blocked on recovery.
//!
//! # Thread Safety
//!
//! `PoolManager` is cheaply cloneable; all state lives behind one `Arc`.
//! The pool handle, watch task and generation counter share a `std` mutex
//! that is never held across an await point. The readiness state is a
//! lock-free atomic cell whose writes happen under that mutex, so a caller
//! observing `Ready` and then locking the cell is guaranteed to see the
//! installed handle.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use metrics::{counter, gauge};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::error::{AcquireError, ConnectError};
use super::state::{PoolState, StateCell};
use crate::backend::{BackendError, PoolBackend};
use crate::config::{DatabaseConfig, RetryConfig};

/// Resilient owner of one pooled database connection handle
pub struct PoolManager<B: PoolBackend> {
    inner: Arc<Inner<B>>,
}

impl<B: PoolBackend> Clone for PoolManager<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<B: PoolBackend> {
    backend: B,
    database: DatabaseConfig,
    retry: RetryConfig,
    state: StateCell,
    shared: Mutex<Shared<B::Handle>>,
    /// Serializes connect cycles; reconnect requests arriving while a cycle
    /// is in flight are coalesced instead of starting a second cycle.
    connect_lock: tokio::sync::Mutex<()>,
}

struct Shared<H> {
    handle: Option<H>,
    watcher: Option<JoinHandle<()>>,
    /// Identifies the currently installed handle; fatal reports from
    /// superseded handles are dropped.
    generation: u64,
    closed: bool,
}

impl<B: PoolBackend> PoolManager<B> {
    /// Create a manager for the given target. No connection is attempted
    /// until [`connect`](Self::connect) is called.
    pub fn new(backend: B, database: DatabaseConfig, retry: RetryConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                database,
                retry,
                state: StateCell::new(),
                shared: Mutex::new(Shared {
                    handle: None,
                    watcher: None,
                    generation: 0,
                    closed: false,
                }),
                connect_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Establish (or re-establish) the pool
    ///
    /// Attempts up to `retry.max_attempts` times with exponential backoff
    /// between attempts. On success the pool has been verified live exactly
    /// once and the manager reports ready. On exhaustion the caller is
    /// expected to treat the error as fatal at startup; the manager itself
    /// schedules no further attempts.
    #[tracing::instrument(skip(self), fields(max_attempts = self.inner.retry.max_attempts))]
    pub async fn connect(&self) -> Result<(), ConnectError> {
        let _cycle = self.inner.connect_lock.lock().await;
        self.run_cycle().await
    }

    /// Whether the pool is currently safe to borrow. No side effects.
    pub fn is_ready(&self) -> bool {
        self.state() == PoolState::Ready
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PoolState {
        self.inner.state.load()
    }

    /// Borrow the pool handle for issuing queries
    ///
    /// Fails immediately when the manager is not ready; callers must not
    /// wait for recovery. The returned handle is the one most recently
    /// verified or installed; no per-call health check is performed.
    pub fn acquire(&self) -> Result<B::Handle, AcquireError> {
        if self.state() != PoolState::Ready {
            return Err(AcquireError::NotReady);
        }
        let shared = self.inner.shared.lock().unwrap();
        shared.handle.clone().ok_or(AcquireError::NotReady)
    }

    /// Graceful, terminal shutdown
    ///
    /// Idempotent: the second and later calls are no-ops. The pool close is
    /// best-effort; state cleanup happens regardless of its outcome, so
    /// after this returns every `acquire` fails and no reconnect can start.
    pub async fn close(&self) {
        let old = {
            let mut shared = self.inner.shared.lock().unwrap();
            if shared.closed {
                return;
            }
            shared.closed = true;
            self.inner.state.store(PoolState::Closed);
            if let Some(watcher) = shared.watcher.take() {
                watcher.abort();
            }
            shared.handle.take()
        };

        gauge!("db_pool_ready").set(0.0);

        if let Some(handle) = old {
            if let Err(err) = self.inner.backend.close(handle).await {
                warn!(error = %err, "error closing pool during shutdown");
            }
        }

        info!("connection manager closed");
    }

    /// One bounded retry cycle. Caller must hold `connect_lock`.
    async fn run_cycle(&self) -> Result<(), ConnectError> {
        let max_attempts = self.inner.retry.max_attempts;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            // Discard any previous handle before opening a new one.
            let old = {
                let mut shared = self.inner.shared.lock().unwrap();
                if shared.closed {
                    return Err(ConnectError::Closed);
                }
                if let Some(watcher) = shared.watcher.take() {
                    watcher.abort();
                }
                let old = shared.handle.take();
                if old.is_some() {
                    self.inner.state.store(PoolState::NotReady);
                }
                old
            };
            if let Some(handle) = old {
                debug!("closing previous pool handle");
                if let Err(err) = self.inner.backend.close(handle).await {
                    warn!(error = %err, "error closing previous pool handle");
                }
            }

            counter!("db_connect_attempts_total").increment(1);

            let outcome = match self.inner.backend.open(&self.inner.database).await {
                Ok(handle) => match self.inner.backend.probe(&handle).await {
                    Ok(()) => Ok(handle),
                    Err(err) => {
                        // The pool opened but cannot serve requests; discard it.
                        if let Err(close_err) = self.inner.backend.close(handle).await {
                            warn!(error = %close_err, "error closing unverified pool handle");
                        }
                        Err(err)
                    }
                },
                Err(err) => Err(err),
            };

            match outcome {
                Ok(handle) => {
                    let installed = {
                        let mut shared = self.inner.shared.lock().unwrap();
                        if shared.closed {
                            None
                        } else {
                            shared.generation += 1;
                            let generation = shared.generation;
                            shared.handle = Some(handle.clone());
                            shared.watcher = Some(self.spawn_watcher(handle.clone(), generation));
                            self.inner.state.store(PoolState::Ready);
                            Some(generation)
                        }
                    };

                    return match installed {
                        Some(generation) => {
                            gauge!("db_pool_ready").set(1.0);
                            info!(attempt, generation, "database pool initialized and verified");
                            Ok(())
                        }
                        None => {
                            // A shutdown landed while we were connecting; it wins.
                            if let Err(err) = self.inner.backend.close(handle).await {
                                warn!(error = %err, "error closing pool opened during shutdown");
                            }
                            Err(ConnectError::Closed)
                        }
                    };
                }
                Err(err) => {
                    warn!(attempt, error = %err, "database connection attempt failed");
                    if attempt >= max_attempts {
                        error!(
                            attempts = max_attempts,
                            "exhausted database connection attempts"
                        );
                        return Err(ConnectError::MaxAttemptsExceeded {
                            attempts: max_attempts,
                        });
                    }
                    let delay = self.inner.retry.delay_for(attempt);
                    debug!(
                        delay_ms = delay.as_millis() as u64,
                        "backing off before next connection attempt"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn spawn_watcher(&self, handle: B::Handle, generation: u64) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let error = manager.inner.backend.watch(&handle).await;
            manager.on_fatal_error(generation, error).await;
        })
    }

    /// React to a fatal pool error reported by the backend
    ///
    /// Readiness is demoted before any reconnect work starts, so concurrent
    /// callers fail fast instead of borrowing a broken handle. Boxed to
    /// break the async type cycle through the watcher task.
    fn on_fatal_error(
        &self,
        generation: u64,
        error: BackendError,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        let manager = self.clone();
        Box::pin(async move {
            {
                let shared = manager.inner.shared.lock().unwrap();
                if shared.closed || shared.generation != generation {
                    debug!(generation, "ignoring fatal error from superseded pool");
                    return;
                }
                manager.inner.state.store(PoolState::NotReady);
            }
            gauge!("db_pool_ready").set(0.0);
            error!(error = %error, "fatal pool error, rebuilding connection pool");
            counter!("db_reconnects_total").increment(1);

            let Ok(_cycle) = manager.inner.connect_lock.try_lock() else {
                debug!("reconnect already in progress, coalescing");
                return;
            };
            {
                // Another cycle may have replaced the pool between the
                // demotion above and winning the lock.
                let shared = manager.inner.shared.lock().unwrap();
                if shared.closed || shared.generation != generation {
                    debug!(generation, "pool already rebuilt, skipping reconnect");
                    return;
                }
            }
            if let Err(err) = manager.run_cycle().await {
                error!(
                    error = %err,
                    "failed to rebuild pool after fatal error, staying not ready"
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, RetryConfig};
    use crate::testing::{Attempt, StubBackend};

    fn manager(
        backend: Arc<StubBackend>,
        max_attempts: u32,
    ) -> PoolManager<Arc<StubBackend>> {
        let retry = RetryConfig {
            max_attempts,
            base_delay: 10,
            max_delay: 100,
        };
        PoolManager::new(backend, DatabaseConfig::default(), retry)
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_sets_ready_and_acquire_returns_handle() {
        let backend = StubBackend::new();
        let manager = manager(backend.clone(), 3);

        assert!(!manager.is_ready());
        manager.connect().await.unwrap();

        assert!(manager.is_ready());
        assert_eq!(manager.state(), PoolState::Ready);
        assert!(manager.acquire().is_ok());
        assert_eq!(backend.opens(), 1);
        assert_eq!(backend.probes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_before_connect_fails() {
        let backend = StubBackend::new();
        let manager = manager(backend, 3);

        assert!(matches!(manager.acquire(), Err(AcquireError::NotReady)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_failure_counts_as_attempt() {
        let backend = StubBackend::new();
        backend.script([
            Attempt::ProbeFails("verification failed".to_string()),
            Attempt::Succeeds,
        ]);
        let manager = manager(backend.clone(), 3);

        manager.connect().await.unwrap();

        assert_eq!(backend.opens(), 2);
        assert_eq!(backend.probes(), 2);
        // The unverified handle from the first attempt was discarded.
        assert_eq!(backend.closes(), 1);
        assert!(manager.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_after_close_fails() {
        let backend = StubBackend::new();
        let manager = manager(backend, 3);

        manager.close().await;
        assert_eq!(manager.state(), PoolState::Closed);
        assert!(matches!(
            manager.connect().await,
            Err(ConnectError::Closed)
        ));
    }
}
