//! Async driver for a [`CycleController`] on the tokio timer.
//!
//! One task owns the controller and processes one event at a time, either
//! an [`Input`] from a [`CycleHandle`] or an elapsed [`Wake`]. That single
//! task is the cooperative execution context: inputs that arrive during a
//! phase are applied immediately, and the loop itself only advances when a
//! wake is delivered.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::SimulateError;

use super::controller::CycleController;
use super::input::Input;
use super::scheduler::{Scheduler, TokioScheduler, Wake};
use super::sink::StatusSink;
use super::state::StatusReport;
use super::timing::CycleTiming;

/// Cloneable sender of inputs to a running controller task.
#[derive(Debug, Clone)]
pub struct CycleHandle {
    input_tx: mpsc::UnboundedSender<Input>,
}

impl CycleHandle {
    /// Queues an input for the controller.
    ///
    /// # Errors
    ///
    /// Returns [`SimulateError::ControllerGone`] if the controller task has
    /// exited.
    pub fn send(&self, input: Input) -> Result<(), SimulateError> {
        self.input_tx
            .send(input)
            .map_err(|_| SimulateError::ControllerGone)
    }
}

/// A spawned controller task and the ends needed to talk to it.
#[derive(Debug)]
pub struct CycleRuntime {
    /// Input side.
    pub handle: CycleHandle,
    /// Every status the controller reports, in order.
    pub reports: mpsc::UnboundedReceiver<StatusReport>,
    /// Resolves when the task exits (cancelled, or every handle dropped).
    pub task: JoinHandle<()>,
}

/// Spawns a controller task on the current tokio runtime.
///
/// The task exits when `cancel` fires or every [`CycleHandle`] is dropped.
/// Either way, timers it armed are cancelled with it.
#[must_use]
pub fn spawn(timing: CycleTiming, cancel: &CancellationToken) -> CycleRuntime {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<Input>();
    let (wake_tx, wake_rx) = mpsc::unbounded_channel();
    let (report_tx, reports) = mpsc::unbounded_channel();

    let task_cancel = cancel.child_token();
    let scheduler = TokioScheduler::new(wake_tx, task_cancel.clone());
    let controller = CycleController::new(timing, scheduler, report_tx);
    let task = tokio::spawn(run_controller(controller, input_rx, wake_rx, task_cancel));

    CycleRuntime {
        handle: CycleHandle { input_tx },
        reports,
        task,
    }
}

/// Event loop of the controller task.
///
/// An elapsed wake is applied before any input queued behind it, so inputs
/// never overtake a phase boundary that has already passed.
async fn run_controller<S: Scheduler, R: StatusSink>(
    mut controller: CycleController<S, R>,
    mut input_rx: mpsc::UnboundedReceiver<Input>,
    mut wake_rx: mpsc::UnboundedReceiver<Wake>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("cycle task cancelled");
                break;
            }
            Some(wake) = wake_rx.recv() => controller.on_wake(wake),
            input = input_rx.recv() => {
                let Some(input) = input else {
                    debug!("all cycle handles dropped");
                    break;
                };
                controller.handle(input);
            }
        }
    }
    cancel.cancel();
}
