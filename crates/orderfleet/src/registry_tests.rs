// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use rust_decimal::Decimal;

use super::*;
use crate::model::{Symbol, VenueKind, WorkerState};

fn test_order(name: &str) -> ReservationOrder {
    ReservationOrder {
        name: name.to_owned(),
        symbol: Symbol::new("BTC", "USDT"),
        price: Decimal::new(100, 0),
        quantity: Decimal::new(1, 0),
        // Long enough that no tick fires within a test's lifetime.
        period_secs: 3600.0,
        venue: VenueKind::Binance,
        credential_alias: "main".into(),
    }
}

fn test_credentials() -> CredentialBundle {
    CredentialBundle { access_key: "ak".into(), secret_key: "sk".into(), passphrase: None }
}

fn manager() -> WorkerManager {
    WorkerManager::new(
        VenueFactory::new(reqwest::Client::new()),
        Arc::new(EventBus::new(32)),
        Duration::from_secs(5),
        1000,
        CancellationToken::new(),
    )
}

#[tokio::test]
async fn add_worker_rejects_duplicate_names() {
    let mgr = manager();
    mgr.add_worker(test_order("o1"), "u1", test_credentials()).await.unwrap();
    let err = mgr.add_worker(test_order("o1"), "u1", test_credentials()).await.unwrap_err();
    assert_eq!(err, FleetError::AlreadyExists);
}

#[tokio::test]
async fn unknown_worker_operations_return_not_found() {
    let mgr = manager();
    assert_eq!(mgr.start_worker("missing").await.unwrap_err(), FleetError::NotFound);
    assert_eq!(mgr.stop_worker("missing").await.unwrap_err(), FleetError::NotFound);
    assert_eq!(mgr.remove_worker("missing").await.unwrap_err(), FleetError::NotFound);
    assert_eq!(mgr.worker_status("missing").await.unwrap_err(), FleetError::NotFound);
}

#[tokio::test]
async fn start_stop_lifecycle_reflects_in_status() {
    let mgr = manager();
    mgr.add_worker(test_order("o1"), "u1", test_credentials()).await.unwrap();

    assert_eq!(mgr.worker_status("o1").await.unwrap().state, WorkerState::Idle);

    mgr.start_worker("o1").await.unwrap();
    assert_eq!(mgr.worker_status("o1").await.unwrap().state, WorkerState::Running);

    mgr.stop_worker("o1").await.unwrap();
    assert_eq!(mgr.worker_status("o1").await.unwrap().state, WorkerState::Stopped);
}

#[tokio::test]
async fn remove_worker_forgets_the_entry() {
    let mgr = manager();
    mgr.add_worker(test_order("o1"), "u1", test_credentials()).await.unwrap();
    mgr.remove_worker("o1").await.unwrap();
    assert_eq!(mgr.worker_status("o1").await.unwrap_err(), FleetError::NotFound);
}

#[tokio::test]
async fn list_workers_filters_by_user() {
    let mgr = manager();
    mgr.add_worker(test_order("o1"), "u1", test_credentials()).await.unwrap();
    mgr.add_worker(test_order("o2"), "u2", test_credentials()).await.unwrap();

    let all = mgr.list_workers(None).await;
    assert_eq!(all.len(), 2);

    let only_u1 = mgr.list_workers(Some("u1")).await;
    assert_eq!(only_u1.len(), 1);
    assert_eq!(only_u1[0].name, "o1");
}

#[tokio::test]
async fn remove_all_workers_clears_the_registry() {
    let mgr = manager();
    mgr.add_worker(test_order("o1"), "u1", test_credentials()).await.unwrap();
    mgr.add_worker(test_order("o2"), "u2", test_credentials()).await.unwrap();
    mgr.start_worker("o1").await.unwrap();

    mgr.remove_all_workers().await;

    assert!(mgr.list_workers(None).await.is_empty());
    assert_eq!(mgr.worker_status("o1").await.unwrap_err(), FleetError::NotFound);
}

#[tokio::test]
async fn recent_events_tails_the_workers_ring() {
    let mgr = manager();
    mgr.add_worker(test_order("o1"), "u1", test_credentials()).await.unwrap();

    assert!(mgr.recent_events("o1", 10).await.unwrap().is_empty());
    assert_eq!(mgr.recent_events("missing", 10).await.unwrap_err(), FleetError::NotFound);

    mgr.clear_recent_events("o1").await.unwrap();
    assert_eq!(mgr.clear_recent_events("missing").await.unwrap_err(), FleetError::NotFound);
}
