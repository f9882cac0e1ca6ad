// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared application state handed to every axum handler.

use std::sync::Arc;

use crate::config::FleetConfig;
use crate::event_bus::EventBus;
use crate::registry::WorkerManager;

/// The fleet's shared state: the worker registry plus the config it was
/// built from. Cheap to clone (everything behind an `Arc`).
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<WorkerManager>,
    pub config: Arc<FleetConfig>,
}

impl AppState {
    pub fn new(manager: Arc<WorkerManager>, config: Arc<FleetConfig>) -> Self {
        Self { manager, config }
    }

    pub fn events(&self) -> Arc<EventBus> {
        self.manager.events()
    }
}
