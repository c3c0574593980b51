//! Explicit per-call context for seating units of work.

use crate::tx::error::{TxError, TxResult};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Why a unit of work stopped before commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// A holder of the context's token, or of a parent token, asked to stop.
    Requested,
    /// The context deadline passed.
    DeadlineExceeded,
}

/// Context passed into every coordinator call.
///
/// Carries a label for log correlation, a cancellation token and an optional
/// deadline. The coordinator checks it between steps and right before
/// commit; a stopped context rolls the unit of work back.
#[derive(Debug, Clone)]
pub struct TxContext {
    label: String,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl TxContext {
    /// Creates a context with a fresh token and no deadline.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Uses an existing token, so a caller can cancel several calls at once.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Stops when `parent` is cancelled; cancelling this context leaves
    /// `parent` and its other children running.
    pub fn with_parent_token(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns why this context stopped, if it did.
    pub fn stop_reason(&self) -> Option<CancelReason> {
        if self.cancel.is_cancelled() {
            return Some(CancelReason::Requested);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Fails with `TxError::Cancelled` once the context has stopped.
    pub fn ensure_active(&self) -> TxResult<()> {
        match self.stop_reason() {
            None => Ok(()),
            Some(reason) => Err(TxError::Cancelled {
                label: self.label.clone(),
                reason,
            }),
        }
    }
}
