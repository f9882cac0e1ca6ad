// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-order scheduler: ticks a `ReservationOrder` on its configured
//! cadence, dispatching each attempt to the order's `VenueAdapter` without
//! letting a slow attempt delay the next scheduled tick.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::{FleetError, VenueError};
use crate::event_bus::EventBus;
use crate::model::{CredentialBundle, EventRecord, ReservationOrder, Severity, WorkerState, WorkerStatus};
use crate::venue::{PlaceLimitSellRequest, VenueAdapter};

/// One running (or idle) reservation order.
pub struct Worker {
    order: ReservationOrder,
    user_id: String,
    adapter: Arc<dyn VenueAdapter>,
    credentials: CredentialBundle,
    events: Arc<EventBus>,
    venue_timeout: Duration,
    status: Mutex<WorkerStatus>,
    /// Bounded ring of this worker's own recent events, newest at the back.
    /// Owned by the worker, never shared outside `recent_events`/`clear_events`.
    ring: Mutex<VecDeque<EventRecord>>,
    ring_capacity: usize,
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Worker {
    /// `parent` is the Manager's root cancellation token: this worker's own
    /// token is a child of it, so a process-wide shutdown cancels every
    /// worker immediately without the Manager having to iterate them first.
    pub fn new(
        order: ReservationOrder,
        user_id: impl Into<String>,
        adapter: Arc<dyn VenueAdapter>,
        credentials: CredentialBundle,
        events: Arc<EventBus>,
        venue_timeout: Duration,
        ring_capacity: usize,
        parent: &CancellationToken,
    ) -> Self {
        Self {
            order,
            user_id: user_id.into(),
            adapter,
            credentials,
            events,
            venue_timeout,
            status: Mutex::new(WorkerStatus::default()),
            ring: Mutex::new(VecDeque::with_capacity(ring_capacity.min(1024))),
            ring_capacity: ring_capacity.max(1),
            cancel: parent.child_token(),
            handle: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.order.name
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn order(&self) -> &ReservationOrder {
        &self.order
    }

    pub async fn status(&self) -> WorkerStatus {
        self.status.lock().await.clone()
    }

    /// Tail of this worker's own event ring, newest last, up to `limit`.
    pub async fn recent_events(&self, limit: usize) -> Vec<EventRecord> {
        let ring = self.ring.lock().await;
        let skip = ring.len().saturating_sub(limit);
        ring.iter().skip(skip).cloned().collect()
    }

    pub async fn clear_events(&self) {
        self.ring.lock().await.clear();
    }

    async fn record(&self, event: EventRecord) {
        {
            let mut ring = self.ring.lock().await;
            if ring.len() >= self.ring_capacity {
                ring.pop_front();
            }
            ring.push_back(event.clone());
        }
        self.events.publish(&event).await;
    }

    /// Spawns the scheduler loop. Returns `AlreadyRunning` if the worker is
    /// already started rather than silently no-op'ing, per the double-start
    /// contract.
    pub async fn start(self: &Arc<Self>) -> Result<(), FleetError> {
        let mut handle = self.handle.lock().await;
        if handle.is_some() {
            return Err(FleetError::AlreadyRunning);
        }
        {
            let mut status = self.status.lock().await;
            status.state = WorkerState::Running;
        }
        let worker = Arc::clone(self);
        *handle = Some(tokio::spawn(async move { worker.run_loop().await }));
        drop(handle);

        self.record(EventRecord::system_log(
            format!("worker '{}' started", self.order.name),
            Severity::Info,
        ))
        .await;
        Ok(())
    }

    /// Cancels the scheduler loop and waits for any in-flight attempt to
    /// finish before returning. Safe to call on an already-stopped worker.
    pub async fn stop(&self) {
        {
            let mut status = self.status.lock().await;
            if status.state != WorkerState::Running {
                return;
            }
            status.state = WorkerState::Stopping;
        }
        self.cancel.cancel();

        let handle = self.handle.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        let mut status = self.status.lock().await;
        status.state = WorkerState::Stopped;
    }

    async fn run_loop(self: Arc<Self>) {
        let period = self.order.tick_period();
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = interval.tick() => {
                    self.dispatch_tick();
                }
            }
        }
    }

    /// Spawns one attempt without awaiting it: a slow or stalled venue call
    /// never pushes back the next scheduled tick. Overlapping attempts for
    /// the same order are allowed; each updates `status` under its own
    /// short-lived lock.
    fn dispatch_tick(self: &Arc<Self>) {
        let worker = Arc::clone(self);
        tokio::spawn(async move { worker.attempt().await });
    }

    async fn attempt(&self) {
        let now = Utc::now();
        {
            let mut status = self.status.lock().await;
            status.last_tick = Some(now);
            status.tick_count += 1;
        }

        if self.credentials.access_key.is_empty() || self.credentials.secret_key.is_empty() {
            let err = VenueError::CredentialMissing;
            {
                let mut status = self.status.lock().await;
                status.error_count += 1;
                status.last_error = Some(err.reason());
            }
            let event = EventRecord::order_log(
                &self.order.name,
                &self.user_id,
                self.order.venue.name(),
                self.order.symbol.to_string(),
                Severity::Error,
                err.to_string(),
            );
            self.record(event).await;
            return;
        }

        let request = PlaceLimitSellRequest {
            symbol: &self.order.symbol,
            price: self.order.price,
            quantity: self.order.quantity,
            credentials: &self.credentials,
        };

        let outcome = self.adapter.place_limit_sell(request, self.venue_timeout).await;

        match outcome {
            Ok(response) => {
                {
                    let mut status = self.status.lock().await;
                    status.last_price = Some(self.order.price);
                }
                let suffix = response
                    .order_id
                    .map(|id| format!(" (order {id})"))
                    .unwrap_or_default();
                let event = EventRecord::order_log(
                    &self.order.name,
                    &self.user_id,
                    self.order.venue.name(),
                    self.order.symbol.to_string(),
                    Severity::Success,
                    format!("limit sell placed{suffix}"),
                )
                .with_price(self.order.price)
                .with_quantity(self.order.quantity);
                self.record(event).await;
            }
            Err(VenueError::NotImplemented(venue)) => {
                let event = EventRecord::order_log(
                    &self.order.name,
                    &self.user_id,
                    self.order.venue.name(),
                    self.order.symbol.to_string(),
                    Severity::Warning,
                    format!("venue not implemented: {venue}"),
                );
                self.record(event).await;
            }
            Err(err) => {
                {
                    let mut status = self.status.lock().await;
                    status.error_count += 1;
                    status.last_error = Some(err.reason());
                }
                let event = EventRecord::order_log(
                    &self.order.name,
                    &self.user_id,
                    self.order.venue.name(),
                    self.order.symbol.to_string(),
                    Severity::Error,
                    err.to_string(),
                );
                self.record(event).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
