// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the order fleet admin HTTP API.
//!
//! Uses `axum_test::TestServer` — no real TCP needed.

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use tokio_util::sync::CancellationToken;

use orderfleet::config::FleetConfig;
use orderfleet::event_bus::EventBus;
use orderfleet::factory::VenueFactory;
use orderfleet::registry::WorkerManager;
use orderfleet::state::AppState;
use orderfleet::transport::build_router;

fn test_config() -> FleetConfig {
    FleetConfig {
        host: "127.0.0.1".into(),
        port: 0,
        auth_token: None,
        venue_timeout_ms: 1000,
        event_ring_size: 100,
        session_queue_size: 32,
        ws_ping_secs: 54,
        ws_read_deadline_secs: 60,
    }
}

fn test_state() -> AppState {
    let manager = Arc::new(WorkerManager::new(
        VenueFactory::new(reqwest::Client::new()),
        Arc::new(EventBus::new(32)),
        Duration::from_secs(1),
        100,
        CancellationToken::new(),
    ));
    AppState::new(manager, Arc::new(test_config()))
}

fn test_server(state: AppState) -> TestServer {
    let router = build_router(state);
    TestServer::new(router).expect("failed to create test server")
}

fn credentials_json() -> serde_json::Value {
    serde_json::json!({ "accessKey": "ak", "secretKey": "sk" })
}

#[tokio::test]
async fn health_reports_worker_count() -> anyhow::Result<()> {
    let state = test_state();
    let server = test_server(state.clone());

    server
        .post("/api/v1/workers")
        .json(&serde_json::json!({
            "name": "o1",
            "symbol": "BTC/USDT",
            "price": "100",
            "quantity": "1",
            "periodSecs": 3600.0,
            "venue": "binance",
            "userId": "u1",
            "credentials": credentials_json(),
        }))
        .await
        .assert_status_ok();

    let resp = server.get("/api/v1/health").await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["status"], "running");
    assert_eq!(body["workerCount"], 1);
    Ok(())
}

#[tokio::test]
async fn create_worker_rejects_duplicate_name() -> anyhow::Result<()> {
    let state = test_state();
    let server = test_server(state);

    let payload = serde_json::json!({
        "name": "dup",
        "symbol": "BTC/USDT",
        "price": "100",
        "quantity": "1",
        "periodSecs": 3600.0,
        "venue": "binance",
        "userId": "u1",
        "credentials": credentials_json(),
    });

    server.post("/api/v1/workers").json(&payload).await.assert_status_ok();
    let resp = server.post("/api/v1/workers").json(&payload).await;
    resp.assert_status(axum::http::StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn create_worker_rejects_malformed_symbol() -> anyhow::Result<()> {
    let state = test_state();
    let server = test_server(state);

    let resp = server
        .post("/api/v1/workers")
        .json(&serde_json::json!({
            "name": "bad-symbol",
            "symbol": "BTCUSDT",
            "price": "100",
            "quantity": "1",
            "periodSecs": 3600.0,
            "venue": "binance",
            "userId": "u1",
            "credentials": credentials_json(),
        }))
        .await;
    resp.assert_status(axum::http::StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unrecognized_venue_still_creates_a_worker() -> anyhow::Result<()> {
    let state = test_state();
    let server = test_server(state);

    let resp = server
        .post("/api/v1/workers")
        .json(&serde_json::json!({
            "name": "unknown-venue",
            "symbol": "BTC/USDT",
            "price": "100",
            "quantity": "1",
            "periodSecs": 3600.0,
            "venue": "some-exchange-nobody-has-heard-of",
            "userId": "u1",
            "credentials": credentials_json(),
        }))
        .await;
    resp.assert_status_ok();

    let listed = server.get("/api/v1/workers").await;
    listed.assert_status_ok();
    let body: serde_json::Value = listed.json();
    assert_eq!(body["workers"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn start_stop_and_remove_lifecycle() -> anyhow::Result<()> {
    let state = test_state();
    let server = test_server(state);

    server
        .post("/api/v1/workers")
        .json(&serde_json::json!({
            "name": "lifecycle",
            "symbol": "BTC/USDT",
            "price": "100",
            "quantity": "1",
            "periodSecs": 3600.0,
            "venue": "binance",
            "userId": "u1",
            "credentials": credentials_json(),
        }))
        .await
        .assert_status_ok();

    server.post("/api/v1/workers/lifecycle/start").await.assert_status_ok();
    server.post("/api/v1/workers/lifecycle/stop").await.assert_status_ok();
    server.delete("/api/v1/workers/lifecycle").await.assert_status_ok();

    let resp = server.post("/api/v1/workers/lifecycle/start").await;
    resp.assert_status(axum::http::StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn recent_events_round_trip() -> anyhow::Result<()> {
    let state = test_state();
    let server = test_server(state);

    server
        .post("/api/v1/workers")
        .json(&serde_json::json!({
            "name": "events-order",
            "symbol": "BTC/USDT",
            "price": "100",
            "quantity": "1",
            "periodSecs": 3600.0,
            "venue": "binance",
            "userId": "u1",
            "credentials": credentials_json(),
        }))
        .await
        .assert_status_ok();

    let resp = server.get("/api/v1/workers/events-order/events").await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert!(body["events"].as_array().unwrap().is_empty());

    let resp = server.get("/api/v1/workers/missing/events").await;
    resp.assert_status(axum::http::StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn health_is_reachable_without_auth_when_token_configured() -> anyhow::Result<()> {
    let mut config = test_config();
    config.auth_token = Some("secret-token".into());
    let manager = Arc::new(WorkerManager::new(
        VenueFactory::new(reqwest::Client::new()),
        Arc::new(EventBus::new(32)),
        Duration::from_secs(1),
        100,
        CancellationToken::new(),
    ));
    let state = AppState::new(manager, Arc::new(config));
    let server = test_server(state);

    server.get("/api/v1/health").await.assert_status_ok();

    let resp = server.get("/api/v1/workers").await;
    resp.assert_status(axum::http::StatusCode::UNAUTHORIZED);

    let resp = server.get("/api/v1/workers").add_header("authorization", "Bearer secret-token").await;
    resp.assert_status_ok();
    Ok(())
}
