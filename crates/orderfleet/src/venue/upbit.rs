// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upbit adapter. Authenticates with a short-lived HS256 JWT carrying a
//! `query_hash` over the unencoded, key-sorted request parameters.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::crypto::{canonical_query_string, format_price, format_quantity, sha512_hex};
use super::{PlaceLimitSellRequest, PlaceLimitSellResponse, VenueAdapter};
use crate::error::VenueError;
use crate::model::Symbol;

const BASE_URL: &str = "https://api.upbit.com/v1/orders";

#[derive(Serialize)]
struct Claims {
    access_key: String,
    nonce: String,
    query_hash: String,
    query_hash_alg: &'static str,
}

#[derive(Deserialize)]
struct OrderResponse {
    uuid: Option<String>,
}

pub struct UpbitAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl UpbitAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, base_url: BASE_URL.to_owned() }
    }

    #[cfg(test)]
    fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }
}

impl UpbitAdapter {
    /// `KRW-BTC` style market code: quote first, then base, hyphenated.
    fn market_code(symbol: &Symbol) -> String {
        format!("{}-{}", symbol.quote, symbol.base)
    }
}

#[async_trait]
impl VenueAdapter for UpbitAdapter {
    fn normalize_symbol(&self, symbol: &Symbol) -> String {
        Self::market_code(symbol)
    }

    async fn place_limit_sell(
        &self,
        req: PlaceLimitSellRequest<'_>,
        timeout: Duration,
    ) -> Result<PlaceLimitSellResponse, VenueError> {
        let market = Self::market_code(req.symbol);
        let price = format_price(req.price, true);
        let volume = format_quantity(req.quantity);

        let params = [
            ("market", market.as_str()),
            ("side", "ask"),
            ("volume", volume.as_str()),
            ("price", price.as_str()),
            ("ord_type", "limit"),
        ];
        let query = canonical_query_string(&params);
        let query_hash = sha512_hex(query.as_bytes());

        let claims = Claims {
            access_key: req.credentials.access_key.clone(),
            nonce: Uuid::new_v4().to_string(),
            query_hash,
            query_hash_alg: "SHA512",
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(req.credentials.secret_key.as_bytes()),
        )
        .map_err(|e| VenueError::Semantic(format!("failed to sign JWT: {e}")))?;

        let body: serde_json::Value = serde_json::json!({
            "market": market,
            "side": "ask",
            "volume": volume,
            "price": price,
            "ord_type": "limit",
        });

        let send = self
            .client
            .post(&self.base_url)
            .bearer_auth(token)
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

        let parsed: OrderResponse = serde_json::from_value(json.clone())
            .map_err(|e| VenueError::Parse(format!("unexpected order response shape: {e}")))?;
        Ok(PlaceLimitSellResponse { order_id: parsed.uuid })
    }
}
