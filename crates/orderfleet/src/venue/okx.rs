// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OKX adapter. Base64 HMAC-SHA256 over
//! `iso8601_timestamp + method + path + body`, passphrase-gated.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;

use super::crypto::{format_price, format_quantity, hmac_sha256_base64};
use super::{PlaceLimitSellRequest, PlaceLimitSellResponse, VenueAdapter};
use crate::error::VenueError;
use crate::model::Symbol;

const BASE_URL: &str = "https://www.okx.com";
const PATH: &str = "/api/v5/trade/order";

#[derive(Deserialize)]
struct Envelope {
    code: String,
    msg: Option<String>,
    data: Vec<OrderData>,
}

#[derive(Deserialize)]
struct OrderData {
    #[serde(rename = "ordId")]
    ord_id: Option<String>,
    #[serde(rename = "sCode")]
    s_code: Option<String>,
    #[serde(rename = "sMsg")]
    s_msg: Option<String>,
}

pub struct OkxAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl OkxAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, base_url: BASE_URL.to_owned() }
    }

    fn market_symbol(symbol: &Symbol) -> String {
        format!("{}-{}", symbol.base, symbol.quote)
    }
}

#[async_trait]
impl VenueAdapter for OkxAdapter {
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
            "instId": Self::market_symbol(req.symbol),
            "tdMode": "cash",
            "side": "sell",
            "ordType": "limit",
            "sz": format_quantity(req.quantity),
            "px": format_price(req.price, false),
        })
        .to_string();

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let prehash = format!("{timestamp}POST{PATH}{body}");
        let signature = hmac_sha256_base64(req.credentials.secret_key.as_bytes(), prehash.as_bytes());

        let send = self
            .client
            .post(format!("{}{PATH}", self.base_url))
            .header("OK-ACCESS-KEY", &req.credentials.access_key)
            .header("OK-ACCESS-SIGN", &signature)
            .header("OK-ACCESS-TIMESTAMP", &timestamp)
            .header("OK-ACCESS-PASSPHRASE", passphrase)
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
        if envelope.code != "0" {
            return Err(VenueError::Semantic(
                envelope.msg.unwrap_or_else(|| super::crypto::extract_reason(&json)),
            ));
        }

        let entry = envelope
            .data
            .into_iter()
            .next()
            .ok_or_else(|| VenueError::Parse("empty order data array".to_owned()))?;
        if entry.s_code.as_deref().is_some_and(|c| c != "0") {
            return Err(VenueError::Semantic(entry.s_msg.unwrap_or_default()));
        }

        Ok(PlaceLimitSellResponse { order_id: entry.ord_id })
    }
}
