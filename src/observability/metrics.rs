//! Metrics collection for `swipesim`.
//!
//! Prometheus-compatible counters for page deliveries and cycle status
//! reports. Without an installed recorder every `record_*` call is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::cycle::Status;
use crate::delivery::Route;
use crate::error::SwipeSimError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without an
/// HTTP endpoint.
///
/// # Errors
///
/// Returns [`SwipeSimError::Metrics`] if the recorder or HTTP listener
/// cannot be installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), SwipeSimError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| SwipeSimError::Metrics(e.to_string()))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "swipesim_requests_total",
        "Total number of page requests served, by route"
    );
    describe_counter!(
        "swipesim_response_bytes_total",
        "Bytes of page content sent, by route"
    );
    describe_counter!(
        "swipesim_status_reports_total",
        "Status reports emitted by the cycle controller"
    );
    describe_counter!(
        "swipesim_cycles_started_total",
        "Number of times the swipe loop was started"
    );
}

/// Records one served page and its payload size.
pub fn record_request(route: Route, bytes: u64) {
    counter!("swipesim_requests_total", "route" => route.label()).increment(1);
    counter!("swipesim_response_bytes_total", "route" => route.label()).increment(bytes);
}

/// Records a status report from a cycle controller.
pub fn record_status(status: Status) {
    counter!("swipesim_status_reports_total", "status" => status.label()).increment(1);
    if status == Status::Started {
        counter!("swipesim_cycles_started_total").increment(1);
    }
}
