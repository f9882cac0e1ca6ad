// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Worker Manager: owns every running `Worker`, enforces one worker per
//! order name, and is the single entry point the admin HTTP API drives.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::event_bus::EventBus;
use crate::error::FleetError;
use crate::factory::VenueFactory;
use crate::model::{CredentialBundle, EventRecord, ReservationOrder, WorkerStatus};
use crate::worker::Worker;

struct Entry {
    worker: Arc<Worker>,
    created_at: DateTime<Utc>,
}

/// Read-only summary of one registered worker, as returned by the admin API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSummary {
    pub name: String,
    pub user_id: String,
    pub venue: String,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub status: WorkerStatus,
}

pub struct WorkerManager {
    workers: tokio::sync::RwLock<HashMap<String, Entry>>,
    events: Arc<EventBus>,
    factory: VenueFactory,
    venue_timeout: Duration,
    event_ring_size: usize,
    /// Root cancellation token. Every Worker's own token is a child of this
    /// one, so cancelling it (process-wide shutdown) stops every worker at
    /// once instead of relying solely on `stop_all`'s explicit iteration.
    shutdown: CancellationToken,
}

impl WorkerManager {
    pub fn new(
        factory: VenueFactory,
        events: Arc<EventBus>,
        venue_timeout: Duration,
        event_ring_size: usize,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            workers: tokio::sync::RwLock::new(HashMap::new()),
            events,
            factory,
            venue_timeout,
            event_ring_size,
            shutdown,
        }
    }

    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    /// Registers a new order. Does not start it: callers call `start_worker`
    /// next, matching the admin API's separate create/start steps.
    pub async fn add_worker(
        &self,
        order: ReservationOrder,
        user_id: impl Into<String>,
        credentials: CredentialBundle,
    ) -> Result<(), FleetError> {
        let mut workers = self.workers.write().await;
        if workers.contains_key(&order.name) {
            return Err(FleetError::AlreadyExists);
        }
        let adapter = self.factory.build(&order.venue);
        let worker = Arc::new(Worker::new(
            order.clone(),
            user_id,
            adapter,
            credentials,
            self.events(),
            self.venue_timeout,
            self.event_ring_size,
            &self.shutdown,
        ));
        workers.insert(order.name.clone(), Entry { worker, created_at: Utc::now() });
        Ok(())
    }

    pub async fn start_worker(&self, name: &str) -> Result<(), FleetError> {
        let worker = self.lookup(name).await?;
        worker.start().await
    }

    pub async fn stop_worker(&self, name: &str) -> Result<(), FleetError> {
        let worker = self.lookup(name).await?;
        worker.stop().await;
        Ok(())
    }

    /// Stops (if running) and forgets the order entirely.
    pub async fn remove_worker(&self, name: &str) -> Result<(), FleetError> {
        let worker = self.lookup(name).await?;
        worker.stop().await;
        self.workers.write().await.remove(name);
        Ok(())
    }

    /// Best-effort stop of every worker, e.g. on graceful shutdown. Entries
    /// remain registered; a failed stop does not abort the sweep.
    pub async fn stop_all(&self) {
        let workers: Vec<Arc<Worker>> =
            self.workers.read().await.values().map(|e| Arc::clone(&e.worker)).collect();
        for worker in workers {
            worker.stop().await;
        }
    }

    /// Stops and forgets every registered order. Exposed to collaborators
    /// as `RemoveAllWorkers` (spec.md §6).
    pub async fn remove_all_workers(&self) {
        self.stop_all().await;
        self.workers.write().await.clear();
    }

    pub async fn worker_status(&self, name: &str) -> Result<WorkerStatus, FleetError> {
        let worker = self.lookup(name).await?;
        Ok(worker.status().await)
    }

    /// Tail of one worker's bounded event ring, newest last, up to `limit`.
    pub async fn recent_events(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<EventRecord>, FleetError> {
        let worker = self.lookup(name).await?;
        Ok(worker.recent_events(limit).await)
    }

    /// Empties one worker's event ring without affecting its counters.
    pub async fn clear_recent_events(&self, name: &str) -> Result<(), FleetError> {
        let worker = self.lookup(name).await?;
        worker.clear_events().await;
        Ok(())
    }

    /// Lists every registered worker, optionally restricted to one user.
    pub async fn list_workers(&self, user_id: Option<&str>) -> Vec<WorkerSummary> {
        let workers = self.workers.read().await;
        let mut out = Vec::with_capacity(workers.len());
        for entry in workers.values() {
            if let Some(uid) = user_id {
                if entry.worker.user_id() != uid {
                    continue;
                }
            }
            out.push(WorkerSummary {
                name: entry.worker.name().to_owned(),
                user_id: entry.worker.user_id().to_owned(),
                venue: entry.worker.order().venue.name(),
                symbol: entry.worker.order().symbol.to_string(),
                created_at: entry.created_at,
                status: entry.worker.status().await,
            });
        }
        out
    }

    async fn lookup(&self, name: &str) -> Result<Arc<Worker>, FleetError> {
        self.workers
            .read()
            .await
            .get(name)
            .map(|e| Arc::clone(&e.worker))
            .ok_or(FleetError::NotFound)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
