//! Cycle controller
//!
//! The `CycleController` owns the run state and the suspended flag, reports
//! statuses to a [`StatusSink`], and asks a [`Scheduler`] for a wake at the
//! end of every phase. All transitions are total: no operation fails.
//!
//! Loop shape while running:
//!
//! ```text
//! report FORWARD -> wait forward -> re-check -> report LATERAL -> wait lateral -> re-check -> ...
//! ```
//!
//! A re-check that finds the controller stopped ends the loop and reports
//! `Stopped`, whatever caused the stop.

use tracing::{debug, trace};

use super::input::Input;
use super::scheduler::{ManualScheduler, Scheduler, Wake};
use super::sink::StatusSink;
use super::state::{Phase, RunState, Status, StatusReport, SuspendedFlag};
use super::timing::CycleTiming;

/// Visibility-aware alternating swipe loop.
///
/// Only one loop is live per controller. Each `start()` from stopped opens a
/// new loop generation; wakes from an older generation are discarded.
pub struct CycleController<S, R> {
    run_state: RunState,
    suspended: SuspendedFlag,
    /// Generation of the most recently started loop (0 before any start)
    generation: u64,
    /// Whether the current generation still has a wake outstanding
    loop_active: bool,
    status: Status,
    timing: CycleTiming,
    scheduler: S,
    sink: R,
}

impl<S: Scheduler, R: StatusSink> CycleController<S, R> {
    /// Creates a stopped controller showing `Ready`.
    #[must_use]
    pub fn new(timing: CycleTiming, scheduler: S, sink: R) -> Self {
        Self {
            run_state: RunState::Stopped,
            suspended: SuspendedFlag::default(),
            generation: 0,
            loop_active: false,
            status: Status::Ready,
            timing,
            scheduler,
            sink,
        }
    }

    /// Starts the loop. Ignored while already running.
    ///
    /// Returns `true` if a new loop was started.
    pub fn start(&mut self) -> bool {
        if self.run_state.is_running() {
            trace!(generation = self.generation, "start ignored; already running");
            return false;
        }

        self.run_state = RunState::Running;
        self.generation += 1;
        self.loop_active = true;
        debug!(generation = self.generation, "cycle started");

        self.report(Status::Started);
        self.enter_phase(Phase::Forward);
        true
    }

    /// Stops the loop unconditionally.
    ///
    /// Also clears the suspended flag, so a later visibility regain does not
    /// report a second, contradictory stop. A pending wake still fires and
    /// ends the loop with its own `Stopped` report.
    pub fn stop(&mut self) {
        if self.run_state.is_running() {
            debug!(generation = self.generation, "cycle stop requested");
        }
        self.run_state = RunState::Stopped;
        self.suspended.clear();
        self.report(Status::Stopped);
    }

    /// Applies the host's visibility signal.
    ///
    /// Hiding snapshots whether the loop is running. Becoming visible after
    /// running hidden forces a stop and reports `Stopped (tab return)`.
    pub fn on_visibility_change(&mut self, hidden: bool) {
        if hidden {
            self.suspended.snapshot(self.run_state);
            trace!(was_running = self.suspended.is_set(), "page hidden");
            return;
        }

        if self.suspended.take() {
            debug!(generation = self.generation, "cycle stopped on tab return");
            self.run_state = RunState::Stopped;
            self.report(Status::StoppedTabReturn);
        }
    }

    /// Performs the re-check for an elapsed phase.
    pub fn on_wake(&mut self, wake: Wake) {
        if wake.generation() != self.generation || !self.loop_active {
            trace!(
                wake_generation = wake.generation(),
                generation = self.generation,
                "discarding superseded wake"
            );
            return;
        }

        if !self.run_state.is_running() {
            self.loop_active = false;
            debug!(generation = self.generation, phase = %wake.phase(), "cycle loop exited");
            self.report(Status::Stopped);
            return;
        }

        self.enter_phase(wake.phase().next());
    }

    /// Dispatches a page input to the matching operation.
    pub fn handle(&mut self, input: Input) {
        match input {
            Input::Press => {
                self.start();
            }
            Input::StopButton => self.stop(),
            Input::Key(key) if Input::is_stop_key(key) => self.stop(),
            Input::Key(key) => trace!(%key, "ignoring key"),
            Input::Visibility { hidden } => self.on_visibility_change(hidden),
        }
    }

    fn enter_phase(&mut self, phase: Phase) {
        trace!(generation = self.generation, %phase, "entering phase");
        self.report(phase.status());
        self.scheduler.schedule(
            self.timing.phase_duration(phase),
            Wake::new(self.generation, phase),
        );
    }

    fn report(&mut self, status: Status) {
        self.status = status;
        self.sink.report(StatusReport {
            at: self.scheduler.now(),
            status,
        });
    }
}

impl<S, R> CycleController<S, R> {
    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Whether the loop is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.run_state.is_running()
    }

    /// Last reported status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Whether the loop was running when the page was last hidden.
    #[must_use]
    pub const fn is_suspended(&self) -> bool {
        self.suspended.is_set()
    }

    /// Whether a loop still has a wake outstanding.
    #[must_use]
    pub const fn loop_active(&self) -> bool {
        self.loop_active
    }

    /// Generation of the most recently started loop.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Phase durations in use.
    #[must_use]
    pub const fn timing(&self) -> CycleTiming {
        self.timing
    }

    /// The scheduler.
    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// The status sink.
    pub const fn sink(&self) -> &R {
        &self.sink
    }
}

impl<R: StatusSink> CycleController<ManualScheduler, R> {
    /// Moves the virtual clock forward by `by`, delivering every wake that
    /// falls due on the way in due order.
    pub fn advance(&mut self, by: std::time::Duration) {
        let target = self.scheduler.now() + by;
        while let Some(wake) = self.scheduler.pop_due(target) {
            self.on_wake(wake);
        }
        self.scheduler.advance_to(target);
    }
}

impl<S, R> std::fmt::Debug for CycleController<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleController")
            .field("run_state", &self.run_state)
            .field("suspended", &self.suspended.is_set())
            .field("generation", &self.generation)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
