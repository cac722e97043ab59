//! Axum router and handlers for the two page routes.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use chrono::Utc;
use tracing::debug;

use super::{DeliveryState, Route};
use crate::asset;
use crate::observability::Event;
use crate::observability::metrics::record_request;

/// Builds the router with `GET /` and `GET /download`.
pub fn build_router(state: Arc<DeliveryState>) -> Router {
    Router::new()
        .route(Route::Page.path(), get(handle_page))
        .route(Route::Download.path(), get(handle_download))
        .with_state(state)
}

/// `GET /` handler.
async fn handle_page(State(state): State<Arc<DeliveryState>>) -> Response {
    respond(&state, Route::Page)
}

/// `GET /download` handler.
async fn handle_download(State(state): State<Arc<DeliveryState>>) -> Response {
    respond(&state, Route::Download)
}

/// Wraps the shared asset in the envelope `route` calls for. The body is
/// the same `Bytes` for both routes; only the headers differ.
fn respond(state: &DeliveryState, route: Route) -> Response {
    let body = state.asset.bytes();
    let len = body.len() as u64;

    debug!(route = route.path(), bytes = len, "serving page");
    record_request(route, len);
    state.events.emit(Event::AssetServed {
        timestamp: Utc::now(),
        route: route.path().to_string(),
        bytes: len,
    });

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, asset::CONTENT_TYPE);
    if let Some(disposition) = route.content_disposition() {
        builder = builder.header(header::CONTENT_DISPOSITION, disposition);
    }

    builder
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::StaticAsset;
    use crate::observability::EventEmitter;
    use axum::http::Request;
    use tower::util::ServiceExt;

    fn test_router() -> Router {
        build_router(Arc::new(DeliveryState::new(StaticAsset::page())))
    }

    async fn get_path(app: Router, path: &str) -> Response {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        app.oneshot(req).await.unwrap()
    }

    async fn body_bytes(resp: Response) -> bytes::Bytes {
        axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_page_route_is_inline_html() {
        let resp = get_path(test_router(), "/").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert!(resp.headers().get(header::CONTENT_DISPOSITION).is_none());
        assert_eq!(body_bytes(resp).await, StaticAsset::page().bytes());
    }

    #[tokio::test]
    async fn test_download_route_is_named_attachment() {
        let resp = get_path(test_router(), "/download").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"swipe_simulator.html\""
        );
    }

    #[tokio::test]
    async fn test_both_routes_return_identical_bytes() {
        let app = test_router();
        let page = body_bytes(get_path(app.clone(), "/").await).await;
        let download = body_bytes(get_path(app, "/download").await).await;
        assert!(!page.is_empty());
        assert_eq!(page, download);
    }

    #[tokio::test]
    async fn test_custom_asset_served_verbatim() {
        let app = build_router(Arc::new(DeliveryState::new(StaticAsset::from_bytes(
            "<p>{{ not a template }}</p>",
        ))));
        let body = body_bytes(get_path(app, "/download").await).await;
        assert_eq!(&body[..], b"<p>{{ not a template }}</p>");
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let resp = get_path(test_router(), "/missing").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_each_response_emits_event() {
        let events = Arc::new(EventEmitter::noop());
        let state = DeliveryState::new(StaticAsset::page()).with_events(Arc::clone(&events));
        let app = build_router(Arc::new(state));

        get_path(app.clone(), "/").await;
        get_path(app.clone(), "/download").await;
        get_path(app, "/nope").await;

        assert_eq!(events.event_count(), 2);
    }
}
