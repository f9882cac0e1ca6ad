// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process publish/subscribe of `EventRecord`s to subscriber sessions.
//!
//! `orderLog` events reach only sessions bound to the matching user
//! identifier; `systemLog` events reach every connected session. Publish
//! never blocks on a slow subscriber: a session whose outbound queue is full
//! is closed and unregistered instead.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};

use crate::model::{EventCategory, EventEnvelope, EventRecord};

/// Identifies one subscriber session within the bus.
pub type SessionId = u64;

struct Subscriber {
    user_id: String,
    tx: mpsc::Sender<Arc<str>>,
}

/// Fan-out hub for `EventRecord`s. Owned once by the Worker Manager.
pub struct EventBus {
    subscribers: RwLock<HashMap<SessionId, Subscriber>>,
    next_id: AtomicU64,
    queue_capacity: usize,
}

impl EventBus {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            queue_capacity,
        }
    }

    /// Register a new subscriber session bound to `user_id`. Returns the
    /// session id and the receiving half of its bounded outbound queue.
    pub async fn subscribe(&self, user_id: impl Into<String>) -> (SessionId, mpsc::Receiver<Arc<str>>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        self.subscribers.write().await.insert(id, Subscriber { user_id: user_id.into(), tx });
        (id, rx)
    }

    /// Remove a subscriber session. Safe to call more than once.
    pub async fn unsubscribe(&self, id: SessionId) {
        self.subscribers.write().await.remove(&id);
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Publish one event. Serializes once, then fans out; sessions whose
    /// queue is full are dropped from the registry (never blocked on).
    pub async fn publish(&self, record: &EventRecord) {
        let envelope = EventEnvelope::new(record);
        let text: Arc<str> = match serde_json::to_string(&envelope) {
            Ok(s) => Arc::from(s),
            Err(e) => {
                tracing::warn!(err = %e, "failed to serialize event envelope");
                return;
            }
        };

        let mut overflowed = Vec::new();
        {
            let subscribers = self.subscribers.read().await;
            for (id, sub) in subscribers.iter() {
                if !wants(record, sub) {
                    continue;
                }
                match sub.tx.try_send(Arc::clone(&text)) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_))
                    | Err(mpsc::error::TrySendError::Closed(_)) => overflowed.push(*id),
                }
            }
        }

        if !overflowed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in overflowed {
                tracing::debug!(session_id = id, "closing session: outbound queue overflow");
                subscribers.remove(&id);
            }
        }
    }
}

fn wants(record: &EventRecord, sub: &Subscriber) -> bool {
    match record.category {
        EventCategory::SystemLog => true,
        EventCategory::OrderLog => {
            record.user_id.as_deref().is_some_and(|uid| uid == sub.user_id)
        }
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
