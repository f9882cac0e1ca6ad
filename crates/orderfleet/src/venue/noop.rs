// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fallback adapter for venue names the Factory does not recognize.
//!
//! Exists so the registry invariant ("every order has a Worker") holds even
//! for a typo'd or not-yet-implemented venue name: the order still gets a
//! Worker, every tick reports `NotImplemented` instead of silently doing
//! nothing or failing construction.

use std::time::Duration;

use async_trait::async_trait;

use super::{PlaceLimitSellRequest, PlaceLimitSellResponse, VenueAdapter};
use crate::error::VenueError;
use crate::model::Symbol;

pub struct NoOpAdapter {
    venue_name: String,
}

impl NoOpAdapter {
    pub fn new(venue_name: impl Into<String>) -> Self {
        Self { venue_name: venue_name.into() }
    }
}

#[async_trait]
impl VenueAdapter for NoOpAdapter {
    fn normalize_symbol(&self, symbol: &Symbol) -> String {
        symbol.to_string()
    }

    async fn place_limit_sell(
        &self,
        _req: PlaceLimitSellRequest<'_>,
        _timeout: Duration,
    ) -> Result<PlaceLimitSellResponse, VenueError> {
        Err(VenueError::NotImplemented(self.venue_name.clone()))
    }
}
