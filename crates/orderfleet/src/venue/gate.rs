// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gate.io adapter. HMAC-SHA512 hex over
//! `METHOD\nPATH\nQUERY\nHEX(SHA512(body))\nTIMESTAMP`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::crypto::{epoch_secs, format_price, format_quantity, hmac_sha512_hex, sha512_hex};
use super::{PlaceLimitSellRequest, PlaceLimitSellResponse, VenueAdapter};
use crate::error::VenueError;
use crate::model::Symbol;

const BASE_URL: &str = "https://api.gateio.ws";
const PATH: &str = "/api/v4/spot/orders";

#[derive(Deserialize)]
struct OrderResponse {
    id: Option<String>,
}

pub struct GateAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl GateAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, base_url: BASE_URL.to_owned() }
    }

    fn market_symbol(symbol: &Symbol) -> String {
        format!("{}_{}", symbol.base, symbol.quote)
    }
}

#[async_trait]
impl VenueAdapter for GateAdapter {
    fn normalize_symbol(&self, symbol: &Symbol) -> String {
        Self::market_symbol(symbol)
    }

    async fn place_limit_sell(
        &self,
        req: PlaceLimitSellRequest<'_>,
        timeout: Duration,
    ) -> Result<PlaceLimitSellResponse, VenueError> {
        let body = serde_json::json!({
            "currency_pair": Self::market_symbol(req.symbol),
            "side": "sell",
            "type": "limit",
            "amount": format_quantity(req.quantity),
            "price": format_price(req.price, false),
        })
        .to_string();

        let timestamp = epoch_secs().to_string();
        let body_hash = sha512_hex(body.as_bytes());
        let prehash = format!("POST\n{PATH}\n\n{body_hash}\n{timestamp}");
        let signature = hmac_sha512_hex(req.credentials.secret_key.as_bytes(), prehash.as_bytes());

        let send = self
            .client
            .post(format!("{}{PATH}", self.base_url))
            .header("KEY", &req.credentials.access_key)
            .header("SIGN", &signature)
            .header("Timestamp", &timestamp)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_symbol_uses_underscore() {
        assert_eq!(GateAdapter::market_symbol(&Symbol::new("btc", "usdt")), "BTC_USDT");
    }
}
