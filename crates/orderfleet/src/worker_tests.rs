// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::*;
use crate::error::VenueError;
use crate::model::{Symbol, VenueKind};
use crate::venue::{PlaceLimitSellResponse, VenueAdapter};

struct MockAdapter {
    calls: AtomicUsize,
    fail_every: Option<usize>,
}

impl MockAdapter {
    fn succeeding() -> Self {
        Self { calls: AtomicUsize::new(0), fail_every: None }
    }

    fn always_failing() -> Self {
        Self { calls: AtomicUsize::new(0), fail_every: Some(1) }
    }
}

#[async_trait]
impl VenueAdapter for MockAdapter {
    fn normalize_symbol(&self, symbol: &Symbol) -> String {
        symbol.to_string()
    }

    async fn place_limit_sell(
        &self,
        _req: PlaceLimitSellRequest<'_>,
        _timeout: Duration,
    ) -> Result<PlaceLimitSellResponse, VenueError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_every.is_some_and(|k| n % k == 0) {
            return Err(VenueError::Semantic("mock failure".to_owned()));
        }
        Ok(PlaceLimitSellResponse { order_id: Some(format!("mock-{n}")) })
    }
}

fn test_order(period_secs: f64) -> ReservationOrder {
    ReservationOrder {
        name: "test-order".into(),
        symbol: Symbol::new("BTC", "USDT"),
        price: Decimal::new(100, 0),
        quantity: Decimal::new(1, 0),
        period_secs,
        venue: VenueKind::Binance,
        credential_alias: "main".into(),
    }
}

fn test_credentials() -> CredentialBundle {
    CredentialBundle { access_key: "ak".into(), secret_key: "sk".into(), passphrase: None }
}

#[tokio::test]
async fn start_transitions_to_running_and_ticks_accumulate() {
    let adapter: Arc<dyn VenueAdapter> = Arc::new(MockAdapter::succeeding());
    let events = Arc::new(EventBus::new(32));
    let worker = Arc::new(Worker::new(
        test_order(0.01),
        "user-1",
        adapter,
        test_credentials(),
        events,
        Duration::from_secs(1),
        1000,
        &CancellationToken::new(),
    ));

    worker.start().await.unwrap();
    assert_eq!(worker.status().await.state, WorkerState::Running);

    tokio::time::sleep(Duration::from_millis(80)).await;
    let status = worker.status().await;
    assert!(status.tick_count >= 1, "expected at least one tick, got {}", status.tick_count);

    worker.stop().await;
    assert_eq!(worker.status().await.state, WorkerState::Stopped);
}

#[tokio::test]
async fn failed_attempts_increment_error_count_and_record_reason() {
    let adapter: Arc<dyn VenueAdapter> = Arc::new(MockAdapter::always_failing());
    let events = Arc::new(EventBus::new(32));
    let worker = Arc::new(Worker::new(
        test_order(0.01),
        "user-1",
        adapter,
        test_credentials(),
        events,
        Duration::from_secs(1),
        1000,
        &CancellationToken::new(),
    ));

    worker.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    worker.stop().await;

    let status = worker.status().await;
    assert!(status.error_count >= 1);
    assert_eq!(status.last_error.as_deref(), Some("mock failure"));
}

#[tokio::test]
async fn stop_on_idle_worker_is_a_no_op() {
    let adapter: Arc<dyn VenueAdapter> = Arc::new(MockAdapter::succeeding());
    let events = Arc::new(EventBus::new(32));
    let worker = Arc::new(Worker::new(
        test_order(1.0),
        "user-1",
        adapter,
        test_credentials(),
        events,
        Duration::from_secs(1),
        1000,
        &CancellationToken::new(),
    ));

    worker.stop().await;
    assert_eq!(worker.status().await.state, WorkerState::Idle);
}

#[tokio::test]
async fn missing_credentials_report_an_error_without_calling_the_adapter() {
    let adapter: Arc<dyn VenueAdapter> = Arc::new(MockAdapter::succeeding());
    let events = Arc::new(EventBus::new(32));
    let credentials = CredentialBundle { access_key: String::new(), secret_key: "sk".into(), passphrase: None };
    let worker = Arc::new(Worker::new(
        test_order(0.01),
        "user-1",
        adapter,
        credentials,
        events,
        Duration::from_secs(1),
        1000,
        &CancellationToken::new(),
    ));

    worker.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    worker.stop().await;

    let status = worker.status().await;
    assert!(status.tick_count >= 1);
    assert!(status.error_count >= 1);
    assert_eq!(status.last_error.as_deref(), Some("credential missing"));
}

#[tokio::test]
async fn unimplemented_venue_reports_a_warning_without_incrementing_errors() {
    struct NeverImplemented;

    #[async_trait]
    impl VenueAdapter for NeverImplemented {
        fn normalize_symbol(&self, symbol: &Symbol) -> String {
            symbol.to_string()
        }

        async fn place_limit_sell(
            &self,
            _req: PlaceLimitSellRequest<'_>,
            _timeout: Duration,
        ) -> Result<PlaceLimitSellResponse, VenueError> {
            Err(VenueError::NotImplemented("made-up".to_owned()))
        }
    }

    let adapter: Arc<dyn VenueAdapter> = Arc::new(NeverImplemented);
    let events = Arc::new(EventBus::new(32));
    let worker = Arc::new(Worker::new(
        test_order(0.01),
        "user-1",
        adapter,
        test_credentials(),
        events,
        Duration::from_secs(1),
        1000,
        &CancellationToken::new(),
    ));

    worker.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    worker.stop().await;

    let status = worker.status().await;
    assert!(status.tick_count >= 1);
    assert_eq!(status.error_count, 0);

    let recent = worker.recent_events(10).await;
    assert!(recent.iter().any(|e| matches!(e.severity, crate::model::Severity::Warning)));
}

#[tokio::test]
async fn recent_events_ring_is_bounded_and_clearable() {
    let adapter: Arc<dyn VenueAdapter> = Arc::new(MockAdapter::succeeding());
    let events = Arc::new(EventBus::new(32));
    let worker = Arc::new(Worker::new(
        test_order(0.01),
        "user-1",
        adapter,
        test_credentials(),
        events,
        Duration::from_secs(1),
        3,
        &CancellationToken::new(),
    ));

    worker.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    worker.stop().await;

    let recent = worker.recent_events(100).await;
    assert!(recent.len() <= 3, "ring should be capped at capacity, got {}", recent.len());

    worker.clear_events().await;
    assert!(worker.recent_events(100).await.is_empty());
}

#[tokio::test]
async fn starting_an_already_running_worker_is_rejected() {
    let adapter: Arc<dyn VenueAdapter> = Arc::new(MockAdapter::succeeding());
    let events = Arc::new(EventBus::new(32));
    let worker = Arc::new(Worker::new(
        test_order(0.01),
        "user-1",
        adapter,
        test_credentials(),
        events,
        Duration::from_secs(1),
        1000,
        &CancellationToken::new(),
    ));

    worker.start().await.unwrap();
    let err = worker.start().await.unwrap_err();
    assert_eq!(err, crate::error::FleetError::AlreadyRunning);
    assert_eq!(worker.status().await.state, WorkerState::Running);
    worker.stop().await;
}
