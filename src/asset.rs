//! The page served by both delivery routes.

use bytes::Bytes;

/// File name the download route asks the client to save under.
pub const DOWNLOAD_FILE_NAME: &str = "swipe_simulator.html";

/// Content type shared by both routes.
pub const CONTENT_TYPE: &str = "text/html; charset=utf-8";

const PAGE: &str = include_str!("../assets/swipe_simulator.html");

/// Immutable page source (markup, styles and the in-page controller).
///
/// Built once and cloned cheaply; every clone shares the same bytes, which
/// is what keeps the inline and download payloads identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAsset {
    bytes: Bytes,
}

impl StaticAsset {
    /// The bundled swipe simulator page.
    #[must_use]
    pub const fn page() -> Self {
        Self {
            bytes: Bytes::from_static(PAGE.as_bytes()),
        }
    }

    /// Wraps arbitrary content, mainly for tests.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Shared handle to the content.
    #[must_use]
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    /// Content length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the content is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Default for StaticAsset {
    fn default() -> Self {
        Self::page()
    }
}
