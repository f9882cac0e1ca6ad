// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP + WebSocket transport for the order fleet service.

pub mod auth;
pub mod http;
pub mod ws;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the axum `Router` with every fleet route wired up.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health (no auth)
        .route("/api/v1/health", get(http::health))
        // Worker lifecycle
        .route("/api/v1/workers", get(http::list_workers).post(http::create_worker))
        .route("/api/v1/workers/{name}", delete(http::remove_worker))
        .route("/api/v1/workers/{name}/start", post(http::start_worker))
        .route("/api/v1/workers/{name}/stop", post(http::stop_worker))
        .route(
            "/api/v1/workers/{name}/events",
            get(http::recent_events).delete(http::clear_recent_events),
        )
        // Session Gateway
        .route("/ws", get(ws::ws_handler))
        // Middleware
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_layer))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
