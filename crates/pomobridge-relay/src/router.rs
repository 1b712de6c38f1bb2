//! Axum router construction for the relay.
//!
//! The relay exposes a single route: the `WebSocket` endpoint at `/`.
//! HTTP-level tracing is provided by `tower-http`.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::RelayState;
use crate::ws;

/// Build the complete Axum router for the relay.
///
/// The router includes:
/// - `GET /` -- `WebSocket` relay endpoint
pub fn build_router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/", get(ws::ws_relay))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
