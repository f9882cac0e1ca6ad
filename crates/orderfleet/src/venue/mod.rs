// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Venue adapters: one per supported exchange, each translating a reservation
//! tick into a signed limit-sell request and classifying the outcome.

pub mod crypto;

pub mod binance;
pub mod bitget;
pub mod bithumb;
pub mod bybit;
pub mod coinbase_exchange;
pub mod coinone;
pub mod gate;
pub mod huobi;
pub mod korbit;
pub mod kucoin;
pub mod mexc;
pub mod noop;
pub mod okx;
pub mod upbit;

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::VenueError;
use crate::model::{CredentialBundle, Symbol};

/// A single attempt to place a limit sell order at a venue.
#[derive(Debug, Clone)]
pub struct PlaceLimitSellRequest<'a> {
    pub symbol: &'a Symbol,
    pub price: Decimal,
    pub quantity: Decimal,
    pub credentials: &'a CredentialBundle,
}

/// Successful placement outcome. `order_id` is `None` when the venue's
/// response did not carry one but the HTTP/semantic result was otherwise
/// successful.
#[derive(Debug, Clone, Default)]
pub struct PlaceLimitSellResponse {
    pub order_id: Option<String>,
}

/// Per-venue signing and request construction. Implementations must not
/// block the scheduler loop longer than the supplied `timeout`.
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    /// The venue's own symbol spelling, exposed for logging and tests.
    fn normalize_symbol(&self, symbol: &Symbol) -> String;

    async fn place_limit_sell(
        &self,
        req: PlaceLimitSellRequest<'_>,
        timeout: Duration,
    ) -> Result<PlaceLimitSellResponse, VenueError>;
}

/// Turn a `reqwest::Error` into the appropriate `VenueError` variant:
/// network/timeout failures are distinguished from the "request built but no
/// body" case, which should not occur but is treated as a network failure.
pub(crate) fn classify_transport_error(err: reqwest::Error) -> VenueError {
    VenueError::Network(err.to_string())
}
