use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Pool lifecycle states
///
/// ```text
/// NotReady ──connect ok──► Ready ──fatal pool error──► NotReady
///     │                      │                            │
///     │                    close                       connect ok
///     │                      ▼                            │
///     └──────close──────► Closed ◄────────────────────────┘ (via Ready)
/// ```
///
/// `Closed` is terminal; there is no `Ready → Ready` transition through the
/// fatal path without an observable `NotReady` instant in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// No verified pool is installed; callers fail fast.
    NotReady,
    /// A verified pool is installed and safe to borrow.
    Ready,
    /// The manager has been shut down and will never serve again.
    Closed,
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "not_ready"),
            Self::Ready => write!(f, "ready"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Lock-free state cell
///
/// Reads are wait-free; writes happen while the manager's shared cell is
/// locked, so state and pool handle stay consistent for any reader that
/// checks the state first.
pub(crate) struct StateCell(AtomicU8);

const NOT_READY: u8 = 0;
const READY: u8 = 1;
const CLOSED: u8 = 2;

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(NOT_READY))
    }

    pub(crate) fn load(&self) -> PoolState {
        match self.0.load(Ordering::Acquire) {
            READY => PoolState::Ready,
            CLOSED => PoolState::Closed,
            _ => PoolState::NotReady,
        }
    }

    pub(crate) fn store(&self, state: PoolState) {
        let value = match state {
            PoolState::NotReady => NOT_READY,
            PoolState::Ready => READY,
            PoolState::Closed => CLOSED,
        };
        self.0.store(value, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_cell_starts_not_ready() {
        let cell = StateCell::new();
        assert_eq!(cell.load(), PoolState::NotReady);
    }

    #[test]
    fn test_state_cell_round_trips() {
        let cell = StateCell::new();
        cell.store(PoolState::Ready);
        assert_eq!(cell.load(), PoolState::Ready);
        cell.store(PoolState::Closed);
        assert_eq!(cell.load(), PoolState::Closed);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PoolState::NotReady.to_string(), "not_ready");
        assert_eq!(PoolState::Ready.to_string(), "ready");
        assert_eq!(PoolState::Closed.to_string(), "closed");
    }
}
