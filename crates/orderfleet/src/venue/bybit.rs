// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bybit (v5) adapter. HMAC-SHA256 hex over
//! `timestamp + api_key + recv_window + body`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::crypto::{epoch_millis, format_price, format_quantity, hmac_sha256_hex};
use super::{PlaceLimitSellRequest, PlaceLimitSellResponse, VenueAdapter};
use crate::error::VenueError;
use crate::model::Symbol;

const BASE_URL: &str = "https://api.bybit.com/v5/order/create";
const RECV_WINDOW: &str = "5000";

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "retCode")]
    ret_code: i64,
    result: Option<OrderResult>,
}

#[derive(Deserialize)]
struct OrderResult {
    #[serde(rename = "orderId")]
    order_id: Option<String>,
}

pub struct BybitAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl BybitAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, base_url: BASE_URL.to_owned() }
    }

    fn market_symbol(symbol: &Symbol) -> String {
        format!("{}{}", symbol.base, symbol.quote)
    }
}

#[async_trait]
impl VenueAdapter for BybitAdapter {
    fn normalize_symbol(&self, symbol: &Symbol) -> String {
        Self::market_symbol(symbol)
    }

    async fn place_limit_sell(
        &self,
        req: PlaceLimitSellRequest<'_>,
        timeout: Duration,
    ) -> Result<PlaceLimitSellResponse, VenueError> {
        let body = serde_json::json!({
            "category": "spot",
            "symbol": Self::market_symbol(req.symbol),
            "side": "Sell",
            "orderType": "Limit",
            "qty": format_quantity(req.quantity),
            "price": format_price(req.price, false),
        })
        .to_string();

        let timestamp = epoch_millis().to_string();
        let prehash = format!("{timestamp}{}{RECV_WINDOW}{body}", req.credentials.access_key);
        let signature = hmac_sha256_hex(req.credentials.secret_key.as_bytes(), prehash.as_bytes());

        let send = self
            .client
            .post(&self.base_url)
            .header("X-BAPI-API-KEY", &req.credentials.access_key)
            .header("X-BAPI-SIGN", &signature)
            .header("X-BAPI-TIMESTAMP", &timestamp)
            .header("X-BAPI-RECV-WINDOW", RECV_WINDOW)
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

        let envelope: Envelope = serde_json::from_value(json.clone())
            .map_err(|e| VenueError::Parse(format!("unexpected order response shape: {e}")))?;
        if envelope.ret_code != 0 {
            return Err(VenueError::Semantic(super::crypto::extract_reason(&json)));
        }

        Ok(PlaceLimitSellResponse {
            order_id: envelope.result.and_then(|r| r.order_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_symbol_concatenates_without_separator() {
        let symbol = Symbol::new("ETH", "USDT");
        assert_eq!(BybitAdapter::market_symbol(&symbol), "ETHUSDT");
    }
}
