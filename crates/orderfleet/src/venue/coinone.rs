// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coinone adapter. The signed payload is base64-encoded JSON; the
//! signature is the hex HMAC-SHA512 of that base64 string, never the raw
//! JSON.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use uuid::Uuid;

use super::crypto::{format_price, format_quantity, hmac_sha512_hex};
use super::{PlaceLimitSellRequest, PlaceLimitSellResponse, VenueAdapter};
use crate::error::VenueError;
use crate::model::Symbol;

const BASE_URL: &str = "https://api.coinone.co.kr/v2.1/order";

#[derive(Deserialize)]
struct Envelope {
    result: String,
    #[serde(rename = "error_code")]
    error_code: Option<String>,
    #[serde(rename = "order_id")]
    order_id: Option<String>,
}

pub struct CoinoneAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl CoinoneAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, base_url: BASE_URL.to_owned() }
    }

    fn target_currency(symbol: &Symbol) -> String {
        symbol.base.to_lowercase()
    }
}

#[async_trait]
impl VenueAdapter for CoinoneAdapter {
    fn normalize_symbol(&self, symbol: &Symbol) -> String {
        Self::target_currency(symbol)
    }

    async fn place_limit_sell(
        &self,
        req: PlaceLimitSellRequest<'_>,
        timeout: Duration,
    ) -> Result<PlaceLimitSellResponse, VenueError> {
        let payload = serde_json::json!({
            "access_token": req.credentials.access_key,
            "nonce": Uuid::new_v4().to_string(),
            "side": "SELL",
            "quote_currency": req.symbol.quote.to_lowercase(),
            "target_currency": Self::target_currency(req.symbol),
            "price": format_price(req.price, true),
            "qty": format_quantity(req.quantity),
        });
        let payload_b64 = BASE64.encode(payload.to_string());
        let signature = hmac_sha512_hex(req.credentials.secret_key.as_bytes(), payload_b64.as_bytes());

        let send = self
            .client
            .post(&self.base_url)
            .header("X-COINONE-PAYLOAD", &payload_b64)
            .header("X-COINONE-SIGNATURE", &signature)
            .header("Content-Type", "application/json")
            .body(payload_b64.clone())
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
        if envelope.result != "success" {
            return Err(VenueError::Semantic(
                envelope.error_code.unwrap_or_else(|| super::crypto::extract_reason(&json)),
            ));
        }

        Ok(PlaceLimitSellResponse { order_id: envelope.order_id })
    }
}
