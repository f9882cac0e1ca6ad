// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bitget adapter. Base64 HMAC-SHA256 over
//! `timestamp + method + path + body`, passphrase-gated.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::crypto::{epoch_millis, format_price, format_quantity, hmac_sha256_base64};
use super::{PlaceLimitSellRequest, PlaceLimitSellResponse, VenueAdapter};
use crate::error::VenueError;
use crate::model::Symbol;

const BASE_URL: &str = "https://api.bitget.com";
const PATH: &str = "/api/v2/spot/trade/place-order";

#[derive(Deserialize)]
struct Envelope {
    code: String,
    msg: Option<String>,
    data: Option<OrderData>,
}

#[derive(Deserialize)]
struct OrderData {
    #[serde(rename = "orderId")]
    order_id: Option<String>,
}

pub struct BitgetAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl BitgetAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, base_url: BASE_URL.to_owned() }
    }

    fn market_symbol(symbol: &Symbol) -> String {
        format!("{}{}", symbol.base, symbol.quote)
    }
}

#[async_trait]
impl VenueAdapter for BitgetAdapter {
    fn normalize_symbol(&self, symbol: &Symbol) -> String {
        Self::market_symbol(symbol)
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
            "symbol": Self::market_symbol(req.symbol),
            "side": "sell",
            "orderType": "limit",
            "force": "gtc",
            "size": format_quantity(req.quantity),
            "price": format_price(req.price, false),
        })
        .to_string();

        let timestamp = epoch_millis().to_string();
        let prehash = format!("{timestamp}POST{PATH}{body}");
        let signature = hmac_sha256_base64(req.credentials.secret_key.as_bytes(), prehash.as_bytes());

        let send = self
            .client
            .post(format!("{}{PATH}", self.base_url))
            .header("ACCESS-KEY", &req.credentials.access_key)
            .header("ACCESS-SIGN", &signature)
            .header("ACCESS-TIMESTAMP", &timestamp)
            .header("ACCESS-PASSPHRASE", passphrase)
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
        if envelope.code != "00000" {
            return Err(VenueError::Semantic(
                envelope.msg.unwrap_or_else(|| super::crypto::extract_reason(&json)),
            ));
        }

        Ok(PlaceLimitSellResponse { order_id: envelope.data.and_then(|d| d.order_id) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_symbol_concatenates_without_separator() {
        assert_eq!(BitgetAdapter::market_symbol(&Symbol::new("sol", "usdt")), "SOLUSDT");
    }
}
