//! Scripted in-memory pool backend
//!
//! Drives the manager through arbitrary connect/failure sequences without a
//! database: each connect attempt consumes one scripted [`Attempt`] (an
//! empty script means success), and fatal runtime errors are injected
//! explicitly with [`StubBackend::trigger_fatal`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::backend::{BackendError, PoolBackend};
use crate::config::DatabaseConfig;

/// Outcome scripted for a single connect attempt
#[derive(Debug, Clone)]
pub enum Attempt {
    /// Pool creation succeeds and the liveness probe passes.
    Succeeds,
    /// Pool creation itself fails.
    OpenFails(String),
    /// Pool creation succeeds but the liveness probe fails.
    ProbeFails(String),
}

/// Handle produced by [`StubBackend`]
///
/// Clones share the same pool identity; tests compare `id` to check that
/// concurrent callers borrow the same pool instance.
#[derive(Debug, Clone)]
pub struct StubHandle {
    pub id: u64,
    probe_error: Option<String>,
}

/// Scripted pool backend for tests
pub struct StubBackend {
    script: Mutex<VecDeque<Attempt>>,
    opens: AtomicU64,
    probes: AtomicU64,
    closes: AtomicU64,
    next_id: AtomicU64,
    fatal_tx: UnboundedSender<String>,
    fatal_rx: tokio::sync::Mutex<UnboundedReceiver<String>>,
}

impl StubBackend {
    pub fn new() -> Arc<Self> {
        let (fatal_tx, fatal_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            opens: AtomicU64::new(0),
            probes: AtomicU64::new(0),
            closes: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
            fatal_tx,
            fatal_rx: tokio::sync::Mutex::new(fatal_rx),
        })
    }

    /// Queue outcomes for the next connect attempts, in order.
    pub fn script(&self, attempts: impl IntoIterator<Item = Attempt>) {
        self.script.lock().unwrap().extend(attempts);
    }

    /// Report a fatal runtime error on the currently watched pool.
    pub fn trigger_fatal(&self, message: &str) {
        let _ = self.fatal_tx.send(message.to_string());
    }

    /// Number of `open` calls observed, i.e. connect attempts made.
    pub fn opens(&self) -> u64 {
        self.opens.load(Ordering::Relaxed)
    }

    /// Number of liveness probes observed.
    pub fn probes(&self) -> u64 {
        self.probes.load(Ordering::Relaxed)
    }

    /// Number of handles closed.
    pub fn closes(&self) -> u64 {
        self.closes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PoolBackend for Arc<StubBackend> {
    type Handle = StubHandle;

    async fn open(&self, _config: &DatabaseConfig) -> Result<Self::Handle, BackendError> {
        self.opens.fetch_add(1, Ordering::Relaxed);
        let attempt = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Attempt::Succeeds);

        match attempt {
            Attempt::OpenFails(message) => Err(BackendError::Open(message)),
            Attempt::Succeeds => Ok(StubHandle {
                id: self.next_id.fetch_add(1, Ordering::Relaxed),
                probe_error: None,
            }),
            Attempt::ProbeFails(message) => Ok(StubHandle {
                id: self.next_id.fetch_add(1, Ordering::Relaxed),
                probe_error: Some(message),
            }),
        }
    }

    async fn probe(&self, handle: &Self::Handle) -> Result<(), BackendError> {
        self.probes.fetch_add(1, Ordering::Relaxed);
        match &handle.probe_error {
            Some(message) => Err(BackendError::Probe(message.clone())),
            None => Ok(()),
        }
    }

    async fn close(&self, _handle: Self::Handle) -> Result<(), BackendError> {
        self.closes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn watch(&self, _handle: &Self::Handle) -> BackendError {
        // The manager keeps at most one watcher alive, so the single
        // receiver is never contended; an aborted watcher releases it.
        let mut fatal_rx = self.fatal_rx.lock().await;
        match fatal_rx.recv().await {
            Some(message) => BackendError::Fatal(message),
            None => std::future::pending().await,
        }
    }
}
