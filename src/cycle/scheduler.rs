//! Timed wake scheduling for the cycle controller.
//!
//! The controller never sleeps. Each time it enters a phase it asks a
//! [`Scheduler`] to hand a [`Wake`] back after the phase duration, and does
//! the re-check when that wake is delivered through
//! [`CycleController::on_wake`](super::CycleController::on_wake).
//!
//! - [`ManualScheduler`]: virtual clock, advanced explicitly by tests and
//!   headless drivers. No real time passes.
//! - [`TokioScheduler`]: arms a tokio timer per wake and delivers it over a
//!   channel to the task that owns the controller.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::state::Phase;

/// A scheduled re-check, delivered back to the controller that asked for it.
///
/// Tagged with the loop generation that scheduled it, so a wake left over
/// from a loop that was stopped and superseded by a new `start()` cannot
/// drive the new loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wake {
    generation: u64,
    phase: Phase,
}

impl Wake {
    pub(crate) const fn new(generation: u64, phase: Phase) -> Self {
        Self { generation, phase }
    }

    /// Loop generation that scheduled this wake.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Phase whose suspension has elapsed.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }
}

/// "Wait N, then deliver the wake" primitive.
pub trait Scheduler {
    /// Time elapsed since this scheduler's origin.
    fn now(&self) -> Duration;

    /// Arranges for `wake` to be delivered to the controller after `delay`.
    fn schedule(&mut self, delay: Duration, wake: Wake);
}

// ============================================================================
// Virtual clock
// ============================================================================

#[derive(Debug)]
struct Pending {
    due: Duration,
    seq: u64,
    wake: Wake,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Ties on `due` fall back to scheduling order.
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Deterministic scheduler backed by a virtual clock.
///
/// Wakes are queued with their due time and handed out in due order by
/// [`pop_due`](Self::pop_due). The clock only moves when a wake is popped or
/// [`advance_to`](Self::advance_to) is called.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_seq: u64,
    pending: BinaryHeap<Reverse<Pending>>,
}

impl ManualScheduler {
    /// Creates a scheduler at virtual time zero with nothing queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of wakes not yet delivered.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Due time of the earliest queued wake.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.peek().map(|Reverse(p)| p.due)
    }

    /// Removes the earliest wake if it is due at or before `until`, moving
    /// the clock to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<Wake> {
        if self.next_due()? > until {
            return None;
        }
        let Reverse(pending) = self.pending.pop()?;
        self.now = self.now.max(pending.due);
        Some(pending.wake)
    }

    /// Moves the clock forward to `target`. Never moves it backwards.
    pub fn advance_to(&mut self, target: Duration) {
        self.now = self.now.max(target);
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, delay: Duration, wake: Wake) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Reverse(Pending {
            due: self.now + delay,
            seq,
            wake,
        }));
    }
}

// ============================================================================
// Tokio timer
// ============================================================================

/// Scheduler that arms a tokio timer per wake.
///
/// Elapsed wakes are sent on `wake_tx`; the task owning the controller
/// receives them and calls `on_wake`. Timers still armed when `cancel`
/// fires are dropped without delivering.
#[derive(Debug)]
pub struct TokioScheduler {
    origin: Instant,
    wake_tx: mpsc::UnboundedSender<Wake>,
    cancel: CancellationToken,
}

impl TokioScheduler {
    /// Creates a scheduler whose origin is the current tokio instant.
    #[must_use]
    pub fn new(wake_tx: mpsc::UnboundedSender<Wake>, cancel: CancellationToken) -> Self {
        Self {
            origin: Instant::now(),
            wake_tx,
            cancel,
        }
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn schedule(&mut self, delay: Duration, wake: Wake) {
        let tx = self.wake_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {
                    trace!(generation = wake.generation, "timer cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    // Receiver gone means the controller task has exited.
                    let _ = tx.send(wake);
                }
            }
        });
    }
}
