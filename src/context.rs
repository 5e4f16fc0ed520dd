//! Per-invocation cancellation context.
//!
//! Each invocation takes a [`RunContext`] carrying an optional cancel
//! signal and an optional deadline. The runner records the termination
//! reason here; the classifier only reads it.

use std::time::Duration;

use tokio::sync::watch;

/// Why an invocation's context stopped waiting, if it did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CancelReason {
    /// The context ran to completion without interference.
    #[default]
    None,
    /// The caller signaled cancellation while the subprocess ran.
    Canceled,
    /// The deadline elapsed while the subprocess ran.
    DeadlineExceeded,
}

/// Cancellation context for a single invocation.
///
/// Contexts are per-invocation values, not shared state. A fresh context
/// reports [`CancelReason::None`].
#[derive(Debug, Default)]
pub struct RunContext {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Duration>,
    reason: CancelReason,
}

impl RunContext {
    /// A context with no cancel signal and no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a cancel signal; the invocation is canceled when it turns
    /// true.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Bound the invocation's wall-clock time. Overrides any default
    /// deadline from the configuration.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Termination reason recorded by the runner. Non-blocking.
    pub fn reason(&self) -> CancelReason {
        self.reason
    }

    /// Records the termination reason. The first recorded reason wins.
    pub(crate) fn set_reason(&mut self, reason: CancelReason) {
        if self.reason == CancelReason::None {
            self.reason = reason;
        }
    }

    pub(crate) fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub(crate) fn cancel_signal(&self) -> Option<watch::Receiver<bool>> {
        self.cancel.clone()
    }
}

/// Resolves once the signal turns true. Never resolves if the sender is
/// dropped without signaling.
pub(crate) async fn wait_canceled(mut cancel: watch::Receiver<bool>) {
    while !*cancel.borrow_and_update() {
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_pending, assert_ready, task};

    use super::*;

    #[test]
    fn fresh_context_reports_no_reason() {
        let ctx = RunContext::new();
        assert_eq!(ctx.reason(), CancelReason::None);
        assert!(ctx.deadline().is_none());
        assert!(ctx.cancel_signal().is_none());
    }

    #[test]
    fn builders_set_signal_and_deadline() {
        let (_tx, rx) = watch::channel(false);
        let ctx = RunContext::new()
            .with_cancel(rx)
            .with_deadline(Duration::from_secs(5));
        assert!(ctx.cancel_signal().is_some());
        assert_eq!(ctx.deadline(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn first_recorded_reason_wins() {
        let mut ctx = RunContext::new();
        ctx.set_reason(CancelReason::DeadlineExceeded);
        ctx.set_reason(CancelReason::Canceled);
        assert_eq!(ctx.reason(), CancelReason::DeadlineExceeded);
    }

    #[test]
    fn wait_canceled_resolves_on_signal() {
        let (tx, rx) = watch::channel(false);
        let mut fut = task::spawn(wait_canceled(rx));

        assert_pending!(fut.poll());
        tx.send(true).expect("receiver alive");
        assert!(fut.is_woken());
        assert_ready!(fut.poll());
    }

    #[test]
    fn wait_canceled_resolves_immediately_when_already_signaled() {
        let (tx, rx) = watch::channel(true);
        let mut fut = task::spawn(wait_canceled(rx));
        assert_ready!(fut.poll());
        drop(tx);
    }

    #[test]
    fn wait_canceled_stays_pending_after_sender_drop() {
        let (tx, rx) = watch::channel(false);
        let mut fut = task::spawn(wait_canceled(rx));

        assert_pending!(fut.poll());
        drop(tx);
        assert_pending!(fut.poll());
    }
}
