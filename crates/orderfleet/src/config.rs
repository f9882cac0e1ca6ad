// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Configuration for the order fleet service.
#[derive(Debug, Clone, clap::Args)]
pub struct FleetConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "ORDERFLEET_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 9900, env = "ORDERFLEET_PORT")]
    pub port: u16,

    /// Bearer token for the admin HTTP API. If unset, auth is disabled.
    #[arg(long, env = "ORDERFLEET_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// Per-venue HTTP request timeout in milliseconds.
    #[arg(long, default_value_t = 10_000, env = "ORDERFLEET_VENUE_TIMEOUT_MS")]
    pub venue_timeout_ms: u64,

    /// Maximum number of events retained per worker's in-memory ring.
    #[arg(long, default_value_t = 1000, env = "ORDERFLEET_EVENT_RING_SIZE")]
    pub event_ring_size: usize,

    /// Bounded outbound queue depth per subscriber session.
    #[arg(long, default_value_t = 256, env = "ORDERFLEET_SESSION_QUEUE_SIZE")]
    pub session_queue_size: usize,

    /// WebSocket keepalive ping interval in seconds.
    #[arg(long, default_value_t = 54, env = "ORDERFLEET_WS_PING_SECS")]
    pub ws_ping_secs: u64,

    /// WebSocket read-liveness deadline in seconds (reset on every pong).
    #[arg(long, default_value_t = 60, env = "ORDERFLEET_WS_READ_DEADLINE_SECS")]
    pub ws_read_deadline_secs: u64,
}

impl FleetConfig {
    pub fn venue_timeout(&self) -> Duration {
        Duration::from_millis(self.venue_timeout_ms)
    }

    pub fn ws_ping_interval(&self) -> Duration {
        Duration::from_secs(self.ws_ping_secs)
    }

    pub fn ws_read_deadline(&self) -> Duration {
        Duration::from_secs(self.ws_read_deadline_secs)
    }
}
