// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Huobi (HTX) adapter. Base64 HMAC-SHA256 over the vendor canonical
//! string `METHOD\nHOST\nPATH\nSORTED_QUERY`, carried as a query parameter
//! rather than a header.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use super::crypto::{canonical_query_string, format_price, format_quantity, hmac_sha256_base64};
use super::{PlaceLimitSellRequest, PlaceLimitSellResponse, VenueAdapter};
use crate::error::VenueError;
use crate::model::Symbol;

const HOST: &str = "api.huobi.pro";
const PATH: &str = "/v1/order/orders/place";

#[derive(Deserialize)]
struct Envelope {
    status: String,
    #[serde(rename = "err-msg")]
    err_msg: Option<String>,
    data: Option<String>,
}

pub struct HuobiAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl HuobiAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, base_url: format!("https://{HOST}") }
    }

    fn market_symbol(symbol: &Symbol) -> String {
        format!("{}{}", symbol.base, symbol.quote).to_lowercase()
    }
}

#[async_trait]
impl VenueAdapter for HuobiAdapter {
    fn normalize_symbol(&self, symbol: &Symbol) -> String {
        Self::market_symbol(symbol)
    }

    async fn place_limit_sell(
        &self,
        req: PlaceLimitSellRequest<'_>,
        timeout: Duration,
    ) -> Result<PlaceLimitSellResponse, VenueError> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        let params = [
            ("AccessKeyId", req.credentials.access_key.as_str()),
            ("SignatureMethod", "HmacSHA256"),
            ("SignatureVersion", "2"),
            ("Timestamp", timestamp.as_str()),
        ];
        let query = canonical_query_string(&params);
        let prehash = format!("POST\n{HOST}\n{PATH}\n{query}");
        let signature = hmac_sha256_base64(req.credentials.secret_key.as_bytes(), prehash.as_bytes());

        let body = serde_json::json!({
            "account-id": req.credentials.access_key,
            "symbol": Self::market_symbol(req.symbol),
            "type": "sell-limit",
            "amount": format_quantity(req.quantity),
            "price": format_price(req.price, false),
        });

        let send = self
            .client
            .post(format!("{}{PATH}", self.base_url))
            .query(&params)
            .query(&[("Signature", signature.as_str())])
            .json(&body)
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
        if envelope.status != "ok" {
            return Err(VenueError::Semantic(
                envelope.err_msg.unwrap_or_else(|| super::crypto::extract_reason(&json)),
            ));
        }

        Ok(PlaceLimitSellResponse { order_id: envelope.data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_symbol_is_lowercase_concatenated() {
        assert_eq!(HuobiAdapter::market_symbol(&Symbol::new("BTC", "USDT")), "btcusdt");
    }
}
