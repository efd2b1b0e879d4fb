//! One-shot cancellable timers for Duello.
//!
//! Every deadline in the system — the disconnect grace period, the
//! pending-challenge expiry, showdown's move window, hot potato's
//! secret fuse, tap race's play window, confession's write and guess
//! phases — is a [`schedule`] call: run this callback once after a
//! delay, unless someone cancels it first.
//!
//! # The re-validation discipline
//!
//! A timer callback races with player actions by construction: the
//! session it targets may have resolved between scheduling and firing.
//! Cancellation narrows that window but cannot close it. Therefore
//! every callback in Duello is written as *"re-check, then act"*:
//! deliver a message to the owning actor (or re-lock the registry) and
//! no-op if the session is gone or the phase moved on. Consumers that
//! skip this check are wrong even if they always cancel diligently.
//!
//! # Integration
//!
//! Callbacks are futures, so a duel actor can hand the timer a clone of
//! its own command sender:
//!
//! ```ignore
//! let tx = self_tx.clone();
//! let handle = schedule(fuse, async move {
//!     let _ = tx.send(DuelCommand::Timeout { epoch });
//! });
//! ```

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

// ---------------------------------------------------------------------------
// TimerHandle
// ---------------------------------------------------------------------------

/// Handle to a scheduled timer.
///
/// Dropping the handle does **not** cancel the timer — a fuse keeps
/// burning even if nobody is looking at it. Call [`cancel`](Self::cancel)
/// explicitly.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Cancels the timer.
    ///
    /// No-op if the timer already fired or was already cancelled. If the
    /// callback is mid-flight on another worker, cancellation stops it
    /// at its next await point at the latest — which is why callbacks
    /// must re-validate before mutating anything (see the crate docs).
    pub fn cancel(&self) {
        if !self.task.is_finished() {
            trace!("timer cancelled");
        }
        self.task.abort();
    }

    /// Whether the timer has run to completion or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

// ---------------------------------------------------------------------------
// schedule
// ---------------------------------------------------------------------------

/// Schedules `callback` to run once after `delay`.
///
/// The callback runs on the Tokio runtime, on its own task —
/// independent of whichever task scheduled it. Must be called from
/// within a runtime.
pub fn schedule<F>(delay: Duration, callback: F) -> TimerHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    trace!(delay_ms = delay.as_millis() as u64, "timer scheduled");
    let task = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        callback.await;
    });
    TimerHandle { task }
}
