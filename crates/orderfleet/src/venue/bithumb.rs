// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bithumb adapter. `Api-Sign` is the base64 encoding of the hex
//! HMAC-SHA512 digest over `endpoint\0params\0nonce`.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;

use super::crypto::{epoch_millis, format_price, format_quantity, hmac_sha512_hex};
use super::{PlaceLimitSellRequest, PlaceLimitSellResponse, VenueAdapter};
use crate::error::VenueError;
use crate::model::Symbol;

const BASE_URL: &str = "https://api.bithumb.com";
const ENDPOINT: &str = "/trade/place";

#[derive(Deserialize)]
struct Envelope {
    status: String,
    message: Option<String>,
    order_id: Option<String>,
}

pub struct BithumbAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl BithumbAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, base_url: BASE_URL.to_owned() }
    }

    fn order_currency(symbol: &Symbol) -> String {
        symbol.base.clone()
    }
}

#[async_trait]
impl VenueAdapter for BithumbAdapter {
    fn normalize_symbol(&self, symbol: &Symbol) -> String {
        Self::order_currency(symbol)
    }

    async fn place_limit_sell(
        &self,
        req: PlaceLimitSellRequest<'_>,
        timeout: Duration,
    ) -> Result<PlaceLimitSellResponse, VenueError> {
        let params = [
            ("order_currency", Self::order_currency(req.symbol)),
            ("payment_currency", req.symbol.quote.clone()),
            ("type", "ask".to_owned()),
            ("units", format_quantity(req.quantity)),
            ("price", format_price(req.price, true)),
        ];
        let param_string = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let nonce = epoch_millis().to_string();
        let prehash = format!("{ENDPOINT}\0{param_string}\0{nonce}");
        let digest_hex = hmac_sha512_hex(req.credentials.secret_key.as_bytes(), prehash.as_bytes());
        let signature = BASE64.encode(digest_hex.as_bytes());

        let send = self
            .client
            .post(format!("{}{ENDPOINT}", self.base_url))
            .header("Api-Key", &req.credentials.access_key)
            .header("Api-Sign", &signature)
            .header("Api-Nonce", &nonce)
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
        if envelope.status != "0000" {
            return Err(VenueError::Semantic(
                envelope.message.unwrap_or_else(|| super::crypto::extract_reason(&json)),
            ));
        }

        Ok(PlaceLimitSellResponse { order_id: envelope.order_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_currency_is_the_base_asset() {
        assert_eq!(BithumbAdapter::order_currency(&Symbol::new("eth", "krw")), "ETH");
    }
}
