//! Single-flight coordination for token refresh.
//!
//! At most one rotate call is in flight per client at any time. Requests
//! that observe a 401 while a refresh is running park on the gate and are
//! woken with the shared outcome once it settles.

use std::sync::Mutex;
use tokio::sync::oneshot;

/// Outcome delivered to every caller in one refresh burst. Cloneable so a
/// single failure can be fanned out to all queued waiters.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RefreshError {
    /// The rotate endpoint answered with a non-success status.
    #[error("Token refresh failed: {0}")]
    Rejected(String),
    /// The rotate call failed at the transport level.
    #[error("Token refresh request failed: {0}")]
    Transport(String),
    /// The rotate call did not settle within the deadline.
    #[error("Token refresh timed out")]
    TimedOut,
    /// The leader's future was dropped before the refresh settled.
    #[error("Token refresh was abandoned")]
    Abandoned,
}

enum GateState {
    Idle,
    Refreshing(Vec<oneshot::Sender<Result<(), RefreshError>>>),
}

/// Result of asking to participate in a refresh.
pub(crate) enum JoinOutcome {
    /// No refresh was running; the caller must run the rotate call and
    /// settle the gate with its result.
    Leader,
    /// A refresh is already in flight; await the shared result.
    Follower(oneshot::Receiver<Result<(), RefreshError>>),
}

pub(crate) struct RefreshGate {
    state: Mutex<GateState>,
}

impl RefreshGate {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Idle),
        }
    }

    /// Join the current refresh cycle, starting one if none is running.
    pub(crate) fn join(&self) -> JoinOutcome {
        let mut state = self.state.lock().expect("refresh gate lock poisoned");
        match &mut *state {
            GateState::Idle => {
                *state = GateState::Refreshing(Vec::new());
                JoinOutcome::Leader
            }
            GateState::Refreshing(waiters) => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                JoinOutcome::Follower(rx)
            }
        }
    }

    /// Settle the in-flight refresh: wake every queued waiter with the
    /// shared result and return to idle. Settling an idle gate is a no-op,
    /// so the drop guard and the normal path cannot double-drain.
    pub(crate) fn settle(&self, result: Result<(), RefreshError>) {
        let waiters = {
            let mut state = self.state.lock().expect("refresh gate lock poisoned");
            match std::mem::replace(&mut *state, GateState::Idle) {
                GateState::Idle => return,
                GateState::Refreshing(waiters) => waiters,
            }
        };

        for tx in waiters {
            let _ = tx.send(result.clone());
        }
    }
}

/// Settles the gate with a failure if the leader is dropped mid-refresh.
/// Without this, a cancelled rotate call would leave every queued waiter
/// pending forever.
pub(crate) struct SettleGuard<'a> {
    gate: &'a RefreshGate,
    armed: bool,
}

impl<'a> SettleGuard<'a> {
    pub(crate) fn new(gate: &'a RefreshGate) -> Self {
        Self { gate, armed: true }
    }

    /// Settle with the refresh outcome and disarm the guard.
    pub(crate) fn settle(mut self, result: Result<(), RefreshError>) {
        self.armed = false;
        self.gate.settle(result);
    }
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.gate.settle(Err(RefreshError::Abandoned));
        }
    }
}
