//! `serve` command handler.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::asset::StaticAsset;
use crate::cli::args::ServeArgs;
use crate::delivery::{DeliveryConfig, DeliveryServer, DeliveryState, parse_bind_addr};
use crate::error::SwipeSimError;
use crate::observability::{Event, EventEmitter};

/// Serve the page on `/` and `/download` until `cancel` fires.
///
/// # Errors
///
/// Returns a delivery error if the bind address is invalid or cannot be
/// bound, or an I/O error if the events file cannot be created.
pub async fn run(args: &ServeArgs, cancel: CancellationToken) -> Result<(), SwipeSimError> {
    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        tracing::info!(port, "Prometheus metrics endpoint started");
    }

    let bind_addr = parse_bind_addr(&args.bind)?;
    let events = Arc::new(EventEmitter::from_optional_file(
        args.events_file.as_deref(),
    )?);

    let asset = StaticAsset::page();
    tracing::debug!(bytes = asset.len(), "page loaded");
    let state = DeliveryState::new(asset).with_events(Arc::clone(&events));

    let server = DeliveryServer::bind(&DeliveryConfig { bind_addr }, state, cancel.clone()).await?;
    let bound_addr = server.local_addr();
    events.emit(Event::ServerStarted {
        timestamp: Utc::now(),
        bind_addr: bound_addr.to_string(),
    });
    tracing::info!(%bound_addr, "HTTP server listening");

    let result = server.wait().await;

    let reason = match &result {
        Ok(()) if cancel.is_cancelled() => "shutdown requested".to_string(),
        Ok(()) => "listener closed".to_string(),
        Err(e) => e.to_string(),
    };
    events.emit(Event::ServerStopped {
        timestamp: Utc::now(),
        reason,
    });

    result.map_err(Into::into)
}
