// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket integration tests for the `/ws` Session Gateway, using real
//! connections against an in-process axum server (no `TestServer`, since
//! that only drives HTTP).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use orderfleet::config::FleetConfig;
use orderfleet::event_bus::EventBus;
use orderfleet::factory::VenueFactory;
use orderfleet::model::{EventRecord, Severity};
use orderfleet::registry::WorkerManager;
use orderfleet::state::AppState;
use orderfleet::transport::build_router;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;
type WsTx = futures_util::stream::SplitSink<WsStream, WsMessage>;
type WsRx = futures_util::stream::SplitStream<WsStream>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn test_config(session_queue_size: usize) -> FleetConfig {
    FleetConfig {
        host: "127.0.0.1".into(),
        port: 0,
        auth_token: None,
        venue_timeout_ms: 1000,
        event_ring_size: 100,
        session_queue_size,
        ws_ping_secs: 54,
        ws_read_deadline_secs: 60,
    }
}

fn test_state(session_queue_size: usize) -> AppState {
    let events = Arc::new(EventBus::new(session_queue_size));
    let manager = Arc::new(WorkerManager::new(
        VenueFactory::new(reqwest::Client::new()),
        Arc::clone(&events),
        Duration::from_secs(1),
        100,
        tokio_util::sync::CancellationToken::new(),
    ));
    AppState::new(manager, Arc::new(test_config(session_queue_size)))
}

async fn spawn_server(state: AppState) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let router = build_router(state);
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok((addr, handle))
}

async fn ws_connect(addr: &SocketAddr, query: &str) -> anyhow::Result<(WsTx, WsRx)> {
    let url = if query.is_empty() {
        format!("ws://{addr}/ws")
    } else {
        format!("ws://{addr}/ws?{query}")
    };
    let (stream, _) = tokio_tungstenite::connect_async(&url)
        .await
        .map_err(|e| anyhow::anyhow!("ws connect: {e}"))?;
    Ok(stream.split())
}

async fn ws_recv(rx: &mut WsRx, timeout: Duration) -> anyhow::Result<serde_json::Value> {
    let msg = tokio::time::timeout(timeout, rx.next())
        .await
        .map_err(|_| anyhow::anyhow!("ws recv timeout"))?
        .ok_or_else(|| anyhow::anyhow!("ws stream closed"))?
        .map_err(|e| anyhow::anyhow!("ws recv: {e}"))?;

    match msg {
        WsMessage::Text(text) => Ok(serde_json::from_str(&text)?),
        other => anyhow::bail!("expected a text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn connecting_without_a_user_id_is_rejected() -> anyhow::Result<()> {
    let state = test_state(32);
    let (addr, _handle) = spawn_server(state).await?;

    let result = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await;
    assert!(result.is_err(), "upgrade without userId should be refused");
    Ok(())
}

#[tokio::test]
async fn subscribed_session_receives_a_matching_order_log_event() -> anyhow::Result<()> {
    let state = test_state(32);
    let events = state.events();
    let (addr, _handle) = spawn_server(state).await?;

    let (_tx, mut rx) = ws_connect(&addr, "userId=u1").await?;

    // Give the server a moment to register the subscription before publishing.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let record = EventRecord::order_log("o1", "u1", "binance", "BTC/USDT", Severity::Success, "limit sell placed");
    events.publish(&record).await;

    let msg = ws_recv(&mut rx, RECV_TIMEOUT).await?;
    assert_eq!(msg["data"]["orderName"], "o1");
    assert_eq!(msg["data"]["message"], "limit sell placed");

    // An event for a different user must not reach this session.
    let other = EventRecord::order_log("o2", "u2", "binance", "BTC/USDT", Severity::Success, "not for us");
    events.publish(&other).await;
    let result = tokio::time::timeout(Duration::from_millis(200), ws_recv(&mut rx, RECV_TIMEOUT)).await;
    assert!(result.is_err(), "event for a different user should not be delivered");

    Ok(())
}

#[tokio::test]
async fn a_saturated_outbound_queue_closes_the_session() -> anyhow::Result<()> {
    // A one-slot queue so a single unread publish already saturates it.
    let state = test_state(1);
    let events = state.events();
    let (addr, _handle) = spawn_server(state).await?;

    let (_tx, mut rx) = ws_connect(&addr, "userId=u1").await?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    for i in 0..64 {
        let record = EventRecord::system_log(format!("flood {i}"), Severity::Info);
        events.publish(&record).await;
    }

    // The bus drops the subscriber once its queue overflows; the socket's
    // sender side is dropped with it, so the client eventually observes the
    // stream end rather than an endless backlog.
    let mut saw_close = false;
    for _ in 0..16 {
        match tokio::time::timeout(Duration::from_millis(500), rx.next()).await {
            Ok(None) => {
                saw_close = true;
                break;
            }
            Ok(Some(Err(_))) => {
                saw_close = true;
                break;
            }
            Ok(Some(Ok(_))) => continue,
            Err(_) => break,
        }
    }
    assert!(saw_close, "queue overflow should eventually close the session");

    Ok(())
}
