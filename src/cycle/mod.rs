//! Swipe cycle controller
//!
//! The timed two-phase loop that the page runs after a press on the swipe
//! area, expressed as an explicit state machine.
//!
//! # Architecture
//!
//! - [`CycleController`]: run state, suspended flag, loop generation
//! - [`Scheduler`]: "wait, then deliver a [`Wake`]" primitive, with a
//!   virtual-clock [`ManualScheduler`] and a tokio-backed [`TokioScheduler`]
//! - [`StatusSink`]: where status reports go
//! - [`runtime`]: one tokio task owning a controller, fed through channels

pub mod controller;
pub mod input;
pub mod runtime;
pub mod scheduler;
pub mod sink;
pub mod state;
pub mod timing;

pub use controller::CycleController;
pub use input::{Input, STOP_KEY};
pub use runtime::{CycleHandle, CycleRuntime};
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler, Wake};
pub use sink::{RecordingSink, StatusSink};
pub use state::{Phase, RunState, Status, StatusReport, SuspendedFlag};
pub use timing::{CycleTiming, FORWARD_DURATION, LATERAL_DURATION};
