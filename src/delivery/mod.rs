//! Page delivery service.
//!
//! Serves the [`StaticAsset`] over HTTP using axum. `GET /` returns it inline
//! for viewing, `GET /download` returns the same bytes as a named
//! attachment. Every other path falls through to axum's default 404.

pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::asset::{DOWNLOAD_FILE_NAME, StaticAsset};
use crate::error::DeliveryError;
use crate::observability::EventEmitter;

pub use routes::build_router;

/// Port the page server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 5000;

/// Bind address used when `--bind` is not given: all interfaces.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// The two routes that return the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `GET /`: inline, for direct viewing.
    Page,
    /// `GET /download`: attachment, for saving.
    Download,
}

impl Route {
    /// Request path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Page => "/",
            Self::Download => "/download",
        }
    }

    /// Metrics label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Download => "download",
        }
    }

    /// `Content-Disposition` value, if the route sets one.
    #[must_use]
    pub fn content_disposition(self) -> Option<String> {
        match self {
            Self::Page => None,
            Self::Download => Some(format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\"")),
        }
    }
}

/// Configuration for the page server.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Address to bind to, e.g. `"0.0.0.0:5000"`.
    pub bind_addr: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

/// State shared by the route handlers.
#[derive(Debug)]
pub struct DeliveryState {
    /// Content returned by both routes.
    pub asset: StaticAsset,
    /// Receives an `AssetServed` event per response.
    pub events: Arc<EventEmitter>,
}

impl DeliveryState {
    /// State serving `asset` with no event output.
    #[must_use]
    pub fn new(asset: StaticAsset) -> Self {
        Self {
            asset,
            events: Arc::new(EventEmitter::noop()),
        }
    }

    /// Replaces the event emitter.
    #[must_use]
    pub fn with_events(mut self, events: Arc<EventEmitter>) -> Self {
        self.events = events;
        self
    }
}

/// A bound, running page server.
#[derive(Debug)]
pub struct DeliveryServer {
    bound_addr: SocketAddr,
    cancel: CancellationToken,
    handle: JoinHandle<std::io::Result<()>>,
}

impl DeliveryServer {
    /// Binds the listener and starts serving in a background task.
    ///
    /// The server shuts down gracefully when `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Bind`] if the TCP listener cannot bind.
    pub async fn bind(
        config: &DeliveryConfig,
        state: DeliveryState,
        cancel: CancellationToken,
    ) -> Result<Self, DeliveryError> {
        let listener =
            TcpListener::bind(&config.bind_addr)
                .await
                .map_err(|source| DeliveryError::Bind {
                    addr: config.bind_addr.clone(),
                    source,
                })?;

        let bound_addr = listener.local_addr().map_err(|source| DeliveryError::Bind {
            addr: config.bind_addr.clone(),
            source,
        })?;

        let router = build_router(Arc::new(state));

        let server_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            info!(%bound_addr, "page server started");
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    server_cancel.cancelled().await;
                })
                .await;
            debug!("page server shut down");
            result
        });

        Ok(Self {
            bound_addr,
            cancel,
            handle,
        })
    }

    /// The address actually bound (useful when binding port 0).
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.bound_addr
    }

    /// Requests a graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Waits for the server task to finish.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Serve`] if the server stopped with an I/O
    /// error or its task panicked.
    pub async fn wait(self) -> Result<(), DeliveryError> {
        match self.handle.await {
            Ok(result) => result.map_err(DeliveryError::Serve),
            Err(join) => Err(DeliveryError::Serve(std::io::Error::other(join.to_string()))),
        }
    }
}

/// Parses a bind address string into a full `host:port` form.
///
/// Accepts:
/// - `:5000` → `0.0.0.0:5000`
/// - `5000` → `0.0.0.0:5000`
/// - `127.0.0.1:5000` → as-is
///
/// # Errors
///
/// Returns [`DeliveryError::InvalidBindAddr`] if the result cannot be
/// parsed as a socket address.
pub fn parse_bind_addr(input: &str) -> Result<String, DeliveryError> {
    let addr = if input.starts_with(':') {
        format!("0.0.0.0{input}")
    } else if input.parse::<u16>().is_ok() {
        format!("0.0.0.0:{input}")
    } else {
        input.to_string()
    };
    addr.parse::<SocketAddr>()
        .map_err(|e| DeliveryError::InvalidBindAddr {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
    Ok(addr)
}
