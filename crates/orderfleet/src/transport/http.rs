// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the order fleet admin API.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::FleetError;
use crate::model::{CredentialBundle, EventRecord, ReservationOrder, Symbol, VenueKind};
use crate::registry::WorkerSummary;
use crate::state::AppState;

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub worker_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkerRequest {
    pub name: String,
    pub symbol: String,
    pub price: rust_decimal::Decimal,
    pub quantity: rust_decimal::Decimal,
    pub period_secs: f64,
    pub venue: VenueKind,
    #[serde(default)]
    pub credential_alias: String,
    pub user_id: String,
    pub credentials: CredentialBundle,
}

#[derive(Debug, Serialize)]
pub struct CreateWorkerResponse {
    pub name: String,
    pub created: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListWorkersQuery {
    pub user: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListWorkersResponse {
    pub workers: Vec<WorkerSummary>,
}

#[derive(Debug, Deserialize)]
pub struct RecentEventsQuery {
    #[serde(default = "default_event_limit")]
    pub limit: usize,
}

fn default_event_limit() -> usize {
    100
}

#[derive(Debug, Serialize)]
pub struct RecentEventsResponse {
    pub events: Vec<EventRecord>,
}

#[derive(Debug, Serialize)]
pub struct LifecycleResponse {
    pub name: String,
    pub ok: bool,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /api/v1/health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let worker_count = state.manager.list_workers(None).await.len();
    Json(HealthResponse { status: "running".to_owned(), worker_count })
}

/// `POST /api/v1/workers` — register a new reservation order.
pub async fn create_worker(
    State(state): State<AppState>,
    Json(req): Json<CreateWorkerRequest>,
) -> impl IntoResponse {
    let symbol: Symbol = match req.symbol.parse() {
        Ok(s) => s,
        Err(e) => return FleetError::InputInvalid.to_http_response(e).into_response(),
    };

    let name = req.name;
    let order = ReservationOrder {
        name: name.clone(),
        symbol,
        price: req.price,
        quantity: req.quantity,
        period_secs: req.period_secs,
        venue: req.venue,
        credential_alias: req.credential_alias,
    };

    match state.manager.add_worker(order, req.user_id, req.credentials).await {
        Ok(()) => Json(CreateWorkerResponse { name, created: true }).into_response(),
        Err(code) => code.to_http_response(format!("worker '{name}' already exists")).into_response(),
    }
}

/// `GET /api/v1/workers?user={id}`
pub async fn list_workers(
    State(state): State<AppState>,
    Query(query): Query<ListWorkersQuery>,
) -> impl IntoResponse {
    let workers = state.manager.list_workers(query.user.as_deref()).await;
    Json(ListWorkersResponse { workers })
}

/// `POST /api/v1/workers/{name}/start`
pub async fn start_worker(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.manager.start_worker(&name).await {
        Ok(()) => Json(LifecycleResponse { name, ok: true }).into_response(),
        Err(code @ FleetError::AlreadyRunning) => {
            code.to_http_response(format!("worker '{name}' is already running")).into_response()
        }
        Err(code) => code.to_http_response(format!("worker '{name}' not found")).into_response(),
    }
}

/// `POST /api/v1/workers/{name}/stop`
pub async fn stop_worker(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.manager.stop_worker(&name).await {
        Ok(()) => Json(LifecycleResponse { name, ok: true }).into_response(),
        Err(code) => code.to_http_response(format!("worker '{name}' not found")).into_response(),
    }
}

/// `DELETE /api/v1/workers/{name}`
pub async fn remove_worker(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.manager.remove_worker(&name).await {
        Ok(()) => Json(LifecycleResponse { name, ok: true }).into_response(),
        Err(code) => code.to_http_response(format!("worker '{name}' not found")).into_response(),
    }
}

/// `GET /api/v1/workers/{name}/events?limit=`
pub async fn recent_events(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<RecentEventsQuery>,
) -> impl IntoResponse {
    match state.manager.recent_events(&name, query.limit).await {
        Ok(events) => Json(RecentEventsResponse { events }).into_response(),
        Err(code) => code.to_http_response(format!("worker '{name}' not found")).into_response(),
    }
}

/// `DELETE /api/v1/workers/{name}/events`
pub async fn clear_recent_events(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.manager.clear_recent_events(&name).await {
        Ok(()) => Json(LifecycleResponse { name, ok: true }).into_response(),
        Err(code) => code.to_http_response(format!("worker '{name}' not found")).into_response(),
    }
}
