// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coinbase Exchange adapter. HMAC-SHA256 hex over
//! `timestamp + "POST" + path + body`, passphrase-gated.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::crypto::{epoch_secs, format_price, format_quantity, hmac_sha256_hex};
use super::{PlaceLimitSellRequest, PlaceLimitSellResponse, VenueAdapter};
use crate::error::VenueError;
use crate::model::Symbol;

const BASE_URL: &str = "https://api.exchange.coinbase.com";
const PATH: &str = "/orders";

#[derive(Deserialize)]
struct OrderResponse {
    id: Option<String>,
}

pub struct CoinbaseExchangeAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl CoinbaseExchangeAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, base_url: BASE_URL.to_owned() }
    }

    fn product_id(symbol: &Symbol) -> String {
        format!("{}-{}", symbol.base, symbol.quote)
    }
}

#[async_trait]
impl VenueAdapter for CoinbaseExchangeAdapter {
    fn normalize_symbol(&self, symbol: &Symbol) -> String {
        Self::product_id(symbol)
    }

    async fn place_limit_sell(
        &self,
        req: PlaceLimitSellRequest<'_>,
        timeout: Duration,
    ) -> Result<PlaceLimitSellResponse, VenueError> {
        let passphrase = req
            .credentials
            .passphrase
            .as_deref()
            .ok_or(VenueError::CredentialMissing)?;

        let body = serde_json::json!({
            "product_id": Self::product_id(req.symbol),
            "side": "sell",
            "type": "limit",
            "size": format_quantity(req.quantity),
            "price": format_price(req.price, false),
        })
        .to_string();

        let timestamp = epoch_secs().to_string();
        let prehash = format!("{timestamp}POST{PATH}{body}");
        let signature = hmac_sha256_hex(req.credentials.secret_key.as_bytes(), prehash.as_bytes());

        let send = self
            .client
            .post(format!("{}{PATH}", self.base_url))
            .header("CB-ACCESS-KEY", &req.credentials.access_key)
            .header("CB-ACCESS-SIGN", &signature)
            .header("CB-ACCESS-TIMESTAMP", &timestamp)
            .header("CB-ACCESS-PASSPHRASE", passphrase)
            .header("Content-Type", "application/json")
            .body(body)
            .send();

        let response = tokio::time::timeout(timeout, send)
            .await
            .map_err(|_| VenueError::Network("request timed out".to_owned()))?
            .map_err(super::classify_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(super::classify_transport_error)?;
        let json: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| VenueError::Parse(format!("invalid JSON body: {e}")))?;

        if !status.is_success() {
            return Err(VenueError::HttpStatus {
                status: status.as_u16(),
                reason: super::crypto::extract_reason(&json),
            });
        }

        let parsed: OrderResponse = serde_json::from_value(json.clone())
            .map_err(|e| VenueError::Parse(format!("unexpected order response shape: {e}")))?;
        Ok(PlaceLimitSellResponse { order_id: parsed.id })
    }
}
