// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binance adapter. HMAC-SHA256 hex signature over the urlencoded query
//! string, sent as the `X-MBX-APIKEY` header plus a `signature` parameter.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::crypto::{epoch_millis, format_price, format_quantity, hmac_sha256_hex};
use super::{PlaceLimitSellRequest, PlaceLimitSellResponse, VenueAdapter};
use crate::error::VenueError;
use crate::model::Symbol;

const BASE_URL: &str = "https://api.binance.com/api/v3/order";

#[derive(Deserialize)]
struct OrderResponse {
    #[serde(rename = "orderId")]
    order_id: Option<serde_json::Value>,
}

pub struct BinanceAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, base_url: BASE_URL.to_owned() }
    }

    fn market_symbol(symbol: &Symbol) -> String {
        format!("{}{}", symbol.base, symbol.quote)
    }
}

#[async_trait]
impl VenueAdapter for BinanceAdapter {
    fn normalize_symbol(&self, symbol: &Symbol) -> String {
        Self::market_symbol(symbol)
    }

    async fn place_limit_sell(
        &self,
        req: PlaceLimitSellRequest<'_>,
        timeout: Duration,
    ) -> Result<PlaceLimitSellResponse, VenueError> {
        let symbol = Self::market_symbol(req.symbol);
        let price = format_price(req.price, false);
        let quantity = format_quantity(req.quantity);
        let timestamp = epoch_millis().to_string();

        let params = [
            ("symbol", symbol.as_str()),
            ("side", "SELL"),
            ("type", "LIMIT"),
            ("timeInForce", "GTC"),
            ("quantity", quantity.as_str()),
            ("price", price.as_str()),
            ("timestamp", timestamp.as_str()),
        ];
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let signature = hmac_sha256_hex(req.credentials.secret_key.as_bytes(), query.as_bytes());

        let send = self
            .client
            .post(&self.base_url)
            .header("X-MBX-APIKEY", &req.credentials.access_key)
            .query(&params)
            .query(&[("signature", signature.as_str())])
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
        Ok(PlaceLimitSellResponse { order_id: parsed.order_id.map(|v| v.to_string()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_symbol_concatenates_without_separator() {
        let symbol = Symbol::new("BTC", "USDT");
        assert_eq!(BinanceAdapter::market_symbol(&symbol), "BTCUSDT");
    }
}
