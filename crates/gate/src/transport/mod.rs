// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket transport: authentication, validation, dispatch.

pub mod auth;
pub mod dispatch;
pub mod handler;
pub mod ratelimit;
pub mod ws;
pub mod ws_msg;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::GateState;

/// Build the axum `Router` with the single upgrade endpoint.
pub fn build_router(state: Arc<GateState>) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
