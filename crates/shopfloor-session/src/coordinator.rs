//! # Refresh Coordinator
//!
//! Pure state machine deciding when to renew the access token and who waits
//! for the renewal. No I/O, no locks: the session actor owns it and drives it
//! one event at a time.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   expired(call, retried = false)                                        │
//! │   ┌──────┐ ─────────────────────────────────► ┌────────────┐            │
//! │   │ Idle │   StartRenewal (call queued)       │ Refreshing │◄─┐         │
//! │   └──────┘ ◄───────────────────────────────── └────────────┘  │         │
//! │      ▲        renewal_succeeded → replay all       │  expired │ Queued  │
//! │      │        renewal_failed    → fail all         └──────────┘         │
//! │      │                                                                  │
//! │      └── expired(call, retried = true) → Rejected (never re-enters)    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `W` is whatever the owner needs to finish a call later (for the actor, the
//! request plus its reply channel).

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

/// What the owner must do after reporting an expired call.
#[derive(Debug, PartialEq, Eq)]
pub enum ExpiredAction<W> {
    /// First expiry: the call is queued and the owner must issue one renewal.
    StartRenewal,
    /// A renewal is already in flight; the call is queued behind it.
    Queued,
    /// The call was already replayed once. Hand it back so the owner can fail
    /// it with `AuthExpired`.
    Rejected(W),
}

#[derive(Debug)]
pub struct RefreshCoordinator<W> {
    state: RefreshState,
    waiters: Vec<W>,
    renewals: u64,
}

impl<W> RefreshCoordinator<W> {
    pub fn new() -> Self {
        RefreshCoordinator {
            state: RefreshState::Idle,
            waiters: Vec::new(),
            renewals: 0,
        }
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// Calls parked behind the in-flight renewal.
    pub fn waiting(&self) -> usize {
        self.waiters.len()
    }

    /// Renewals started since creation.
    pub fn renewals(&self) -> u64 {
        self.renewals
    }

    /// A call came back with an expired credential.
    pub fn on_expired(&mut self, waiter: W, retried: bool) -> ExpiredAction<W> {
        if retried {
            return ExpiredAction::Rejected(waiter);
        }

        self.waiters.push(waiter);
        match self.state {
            RefreshState::Idle => {
                self.state = RefreshState::Refreshing;
                self.renewals += 1;
                debug!(renewal = self.renewals, "Starting credential renewal");
                ExpiredAction::StartRenewal
            }
            RefreshState::Refreshing => {
                debug!(waiting = self.waiters.len(), "Queued behind in-flight renewal");
                ExpiredAction::Queued
            }
        }
    }

    /// Renewal succeeded: back to idle, every waiter is returned for replay in
    /// arrival order.
    pub fn renewal_succeeded(&mut self) -> Vec<W> {
        self.settle()
    }

    /// Renewal failed: back to idle, every waiter is returned to be failed.
    pub fn renewal_failed(&mut self) -> Vec<W> {
        self.settle()
    }

    fn settle(&mut self) -> Vec<W> {
        if self.state == RefreshState::Idle {
            return Vec::new();
        }
        self.state = RefreshState::Idle;
        std::mem::take(&mut self.waiters)
    }
}

impl<W> Default for RefreshCoordinator<W> {
    fn default() -> Self {
        Self::new()
    }
}
