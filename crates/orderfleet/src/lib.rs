// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orderfleet: a desktop-hosted engine that schedules recurring limit-sell
//! orders across crypto trading venues and streams their outcomes to
//! subscribed clients over WebSocket.

pub mod config;
pub mod error;
pub mod event_bus;
pub mod factory;
pub mod model;
pub mod registry;
pub mod state;
pub mod transport;
pub mod venue;
pub mod worker;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::FleetConfig;
use crate::event_bus::EventBus;
use crate::factory::VenueFactory;
use crate::registry::WorkerManager;
use crate::state::AppState;
use crate::transport::build_router;

/// Run the fleet server until shutdown.
pub async fn run(config: FleetConfig) -> anyhow::Result<()> {
    // reqwest's rustls backend needs a process-wide default crypto provider
    // installed before the first TLS connection; ignore "already installed"
    // so tests that call `run` more than once in a process don't panic.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let client = reqwest::Client::new();
    let factory = VenueFactory::new(client);
    let events = Arc::new(EventBus::new(config.session_queue_size));
    let manager = Arc::new(WorkerManager::new(
        factory,
        events,
        config.venue_timeout(),
        config.event_ring_size,
        shutdown.clone(),
    ));
    let config = Arc::new(config);
    let state = AppState::new(Arc::clone(&manager), Arc::clone(&config));

    tracing::info!("orderfleet listening on {addr}");
    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;

    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        shutdown_signal.cancel();
    });

    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    manager.stop_all().await;
    Ok(())
}
