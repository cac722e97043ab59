//! `simulate` command handler.
//!
//! Runs the swipe cycle headless: input lines come from stdin, status
//! reports go to stdout, one per line.

use std::io::Write;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::cli::args::{OutputFormat, SimulateArgs};
use crate::cycle::{self, CycleRuntime, CycleTiming, Input, Status, StatusReport};
use crate::error::SwipeSimError;
use crate::observability::metrics::record_status;
use crate::observability::{Event, EventEmitter};

/// Line that ends the simulation.
const QUIT: &str = "quit";

/// Settings for one [`drive`] call.
#[derive(Debug, Clone, Copy)]
pub struct DriveOptions {
    /// Phase durations.
    pub timing: CycleTiming,
    /// Send a press before reading any input.
    pub auto_start: bool,
    /// Stop after this long. Without it, EOF on input also stops.
    pub duration: Option<Duration>,
    /// How reports are written.
    pub format: OutputFormat,
}

/// What a finished simulation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulationSummary {
    /// Reports written.
    pub reports: usize,
    /// Status of the final report, if any.
    pub last: Option<Status>,
}

/// Run the cycle against stdin/stdout.
///
/// # Errors
///
/// Returns a simulate error for zero phase durations, or an I/O error if
/// stdout or the events file cannot be written.
pub async fn run(args: &SimulateArgs, cancel: CancellationToken) -> Result<(), SwipeSimError> {
    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        tracing::info!(port, "Prometheus metrics endpoint started");
    }

    let options = DriveOptions {
        timing: CycleTiming::new(args.forward, args.lateral)?,
        auto_start: args.auto_start,
        duration: args.duration,
        format: args.format,
    };
    let events = EventEmitter::from_optional_file(args.events_file.as_deref())?;

    tracing::info!(
        forward = ?options.timing.forward(),
        lateral = ?options.timing.lateral(),
        "simulation started"
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    let summary = drive(options, stdin, &mut stdout, &events, &cancel).await?;

    tracing::info!(
        reports = summary.reports,
        last = summary.last.map(Status::label),
        "simulation finished"
    );
    Ok(())
}

/// Drives a controller task from `input` lines and writes each report to
/// `out` until `quit`, the deadline, end of input or `cancel`.
///
/// Inputs already queued when the loop ends are still applied, and their
/// reports are written before returning.
///
/// # Errors
///
/// Returns an I/O error if reading `input` or writing `out` fails, or
/// [`crate::error::SimulateError::ControllerGone`] if the controller task
/// exited early.
pub async fn drive<R, W>(
    options: DriveOptions,
    input: R,
    out: &mut W,
    events: &EventEmitter,
    cancel: &CancellationToken,
) -> Result<SimulationSummary, SwipeSimError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let CycleRuntime {
        handle,
        mut reports,
        task,
    } = cycle::runtime::spawn(options.timing, cancel);
    let mut summary = SimulationSummary::default();

    if options.auto_start {
        handle.send(Input::Press)?;
    }

    let deadline = options.duration.map(|d| Instant::now() + d);
    let expired = async move {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(expired);

    let mut lines = input.lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!("simulation cancelled");
                break;
            }
            () = &mut expired => {
                tracing::debug!("simulation duration elapsed");
                break;
            }
            Some(report) = reports.recv() => {
                write_report(out, options.format, &report)?;
                observe(events, &report, &mut summary);
            }
            line = lines.next_line(), if input_open => {
                match line? {
                    Some(line) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        if line.eq_ignore_ascii_case(QUIT) {
                            tracing::debug!("quit requested");
                            break;
                        }
                        match line.parse::<Input>() {
                            Ok(input) => handle.send(input)?,
                            Err(e) => tracing::warn!(error = %e, "ignoring input"),
                        }
                    }
                    None if options.duration.is_some() => {
                        tracing::debug!("input closed, running until deadline");
                        input_open = false;
                    }
                    None => {
                        tracing::debug!("input closed");
                        break;
                    }
                }
            }
        }
    }

    drop(handle);
    if let Err(e) = task.await {
        tracing::warn!(error = %e, "cycle task did not exit cleanly");
    }
    while let Some(report) = reports.recv().await {
        write_report(out, options.format, &report)?;
        observe(events, &report, &mut summary);
    }
    out.flush()?;

    Ok(summary)
}

fn observe(events: &EventEmitter, report: &StatusReport, summary: &mut SimulationSummary) {
    record_status(report.status);
    events.emit(Event::status_changed(report));
    summary.reports += 1;
    summary.last = Some(report.status);
}

/// Writes one report line.
///
/// Human lines read `[   2.500s] Status: Swiping left`; JSON lines are the
/// serialized [`StatusReport`].
fn write_report<W: Write>(
    out: &mut W,
    format: OutputFormat,
    report: &StatusReport,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Human => writeln!(
            out,
            "[{:>8.3}s] Status: {}",
            report.at.as_secs_f64(),
            report.status.text()
        ),
        OutputFormat::Json => {
            let line = serde_json::to_string(report).map_err(std::io::Error::other)?;
            writeln!(out, "{line}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(auto_start: bool, duration: Option<Duration>, format: OutputFormat) -> DriveOptions {
        DriveOptions {
            timing: CycleTiming::default(),
            auto_start,
            duration,
            format,
        }
    }

    async fn run_script(script: &str, opts: DriveOptions) -> (SimulationSummary, String) {
        let mut out = Vec::new();
        let events = EventEmitter::noop();
        let cancel = CancellationToken::new();
        let summary = drive(opts, script.as_bytes(), &mut out, &events, &cancel)
            .await
            .unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_start_prints_timed_phases() {
        let opts = options(
            true,
            Some(Duration::from_millis(3200)),
            OutputFormat::Human,
        );
        let (summary, out) = run_script("", opts).await;

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            [
                "[   0.000s] Status: Started",
                "[   0.000s] Status: Swiping forward",
                "[   2.500s] Status: Swiping left",
                "[   3.000s] Status: Swiping forward",
            ]
        );
        assert_eq!(summary.reports, 4);
        assert_eq!(summary.last, Some(Status::SwipingForward));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_applies_queued_inputs() {
        let (summary, out) = run_script("press\nquit\n", options(false, None, OutputFormat::Human)).await;
        assert!(out.contains("Status: Started"));
        assert!(out.contains("Status: Swiping forward"));
        assert_eq!(summary.reports, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eof_without_duration_ends_run() {
        let (summary, out) = run_script("", options(false, None, OutputFormat::Human)).await;
        assert_eq!(summary, SimulationSummary::default());
        assert!(out.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_lines_are_skipped() {
        let (summary, _) =
            run_script("jump\n\n  \npress\nquit\n", options(false, None, OutputFormat::Human)).await;
        assert_eq!(summary.reports, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_key_then_quit() {
        let (summary, out) =
            run_script("press\nL\nquit\n", options(false, None, OutputFormat::Human)).await;
        assert_eq!(summary.last, Some(Status::Stopped));
        assert!(out.contains("Status: Stopped"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_json_lines_are_reports() {
        let opts = options(true, Some(Duration::from_millis(100)), OutputFormat::Json);
        let (_, out) = run_script("", opts).await;

        let first: serde_json::Value = serde_json::from_str(out.lines().next().unwrap()).unwrap();
        assert_eq!(first["status"], "started");
        assert_eq!(first["elapsed_ms"], 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_ends_run() {
        let mut out = Vec::new();
        let events = EventEmitter::noop();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let summary = drive(
            options(true, None, OutputFormat::Human),
            tokio::io::empty(),
            &mut out,
            &events,
            &cancel,
        )
        .await
        .unwrap();
        assert!(summary.reports <= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_are_emitted_as_events() {
        let mut out = Vec::new();
        let events = EventEmitter::noop();
        let cancel = CancellationToken::new();

        drive(
            options(false, None, OutputFormat::Human),
            "press\nstop\nquit\n".as_bytes(),
            &mut out,
            &events,
            &cancel,
        )
        .await
        .unwrap();
        assert_eq!(events.event_count(), 3);
    }
}
