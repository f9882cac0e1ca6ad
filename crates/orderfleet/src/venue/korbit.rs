// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Korbit adapter. HMAC-SHA256 hex over the urlencoded form body, sent as
//! the `X-KAPI-KEY` identified request's signature.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::crypto::{epoch_millis, format_price, format_quantity, hmac_sha256_hex};
use super::{PlaceLimitSellRequest, PlaceLimitSellResponse, VenueAdapter};
use crate::error::VenueError;
use crate::model::Symbol;

const BASE_URL: &str = "https://api.korbit.co.kr/v2/orders";

#[derive(Deserialize)]
struct Envelope {
    status: String,
    message: Option<String>,
    #[serde(rename = "orderId")]
    order_id: Option<String>,
}

pub struct KorbitAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl KorbitAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, base_url: BASE_URL.to_owned() }
    }

    fn market_pair(symbol: &Symbol) -> String {
        format!("{}_{}", symbol.base, symbol.quote).to_lowercase()
    }
}

#[async_trait]
impl VenueAdapter for KorbitAdapter {
    fn normalize_symbol(&self, symbol: &Symbol) -> String {
        Self::market_pair(symbol)
    }

    async fn place_limit_sell(
        &self,
        req: PlaceLimitSellRequest<'_>,
        timeout: Duration,
    ) -> Result<PlaceLimitSellResponse, VenueError> {
        let timestamp = epoch_millis().to_string();
        let params = [
            ("symbol", Self::market_pair(req.symbol)),
            ("side", "sell".to_owned()),
            ("orderType", "limit".to_owned()),
            ("price", format_price(req.price, true)),
            ("qty", format_quantity(req.quantity)),
            ("timestamp", timestamp.clone()),
        ];
        let form_body =
            params.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");
        let signature = hmac_sha256_hex(req.credentials.secret_key.as_bytes(), form_body.as_bytes());

        let send = self
            .client
            .post(&self.base_url)
            .header("X-KAPI-KEY", &req.credentials.access_key)
            .header("X-KAPI-SIGN", &signature)
            .form(&params)
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
        if envelope.status != "success" {
            return Err(VenueError::Semantic(
                envelope.message.unwrap_or_else(|| super::crypto::extract_reason(&json)),
            ));
        }

        Ok(PlaceLimitSellResponse { order_id: envelope.order_id })
    }
}
