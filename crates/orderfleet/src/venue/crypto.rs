// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared signing primitives used across venue adapters.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256, Sha512};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// `hex(HMAC-SHA256(key, msg))`.
// `Hmac<Sha256>::new_from_slice` only errors on a key length the algorithm
// rejects; HMAC accepts keys of any length, so this never hits the Err arm.
#[allow(clippy::expect_used)]
pub fn hmac_sha256_hex(key: &[u8], msg: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(msg);
    hex::encode(mac.finalize().into_bytes())
}

/// `base64(HMAC-SHA256(key, msg))`.
#[allow(clippy::expect_used)]
pub fn hmac_sha256_base64(key: &[u8], msg: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(msg);
    BASE64.encode(mac.finalize().into_bytes())
}

/// `hex(HMAC-SHA512(key, msg))`.
#[allow(clippy::expect_used)]
pub fn hmac_sha512_hex(key: &[u8], msg: &[u8]) -> String {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(msg);
    hex::encode(mac.finalize().into_bytes())
}

/// Lowercase hex SHA-512 digest of `msg`.
pub fn sha512_hex(msg: &[u8]) -> String {
    let mut hasher = Sha512::new();
    hasher.update(msg);
    hex::encode(hasher.finalize())
}

/// Lowercase hex SHA-256 digest of `msg`.
pub fn sha256_hex(msg: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(msg);
    hex::encode(hasher.finalize())
}

/// Current Unix epoch time in milliseconds, as used by most venue timestamp headers.
pub fn epoch_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Current Unix epoch time in seconds.
pub fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Format a quantity as fixed-point with 8 fractional digits, per spec.md
/// §4.1 ("Tie-breaks and edge cases").
pub fn format_quantity(quantity: Decimal) -> String {
    format!("{:.8}", quantity)
}

/// Format a price. Korean-won venues (Upbit, Bithumb, Coinone, Korbit) quote
/// integer KRW; all others use 8 fractional digits.
pub fn format_price(price: Decimal, integer_krw: bool) -> String {
    if integer_krw {
        format!("{}", price.trunc())
    } else {
        format!("{:.8}", price)
    }
}

/// Extract a human-readable failure reason from a venue JSON body, following
/// the precedence spec.md settles on: `retMsg` > `message` > `errorMsg` >
/// `error` > raw body (never the raw HTTP body when a structured reason is
/// available).
pub fn extract_reason(body: &serde_json::Value) -> String {
    for field in ["retMsg", "message", "errorMsg", "error"] {
        if let Some(text) = body.get(field).and_then(|v| v.as_str()) {
            if !text.is_empty() {
                return text.to_owned();
            }
        }
    }
    // `error` may itself be a nested object (e.g. `{"error": {"message": "..."}}`).
    if let Some(nested) = body.get("error") {
        if let Some(text) = nested.get("message").and_then(|v| v.as_str()) {
            return text.to_owned();
        }
    }
    truncate_raw(&body.to_string())
}

fn truncate_raw(raw: &str) -> String {
    const MAX: usize = 256;
    if raw.len() <= MAX {
        raw.to_owned()
    } else {
        format!("{}...", &raw[..MAX])
    }
}

/// Build the canonical `k=v&k=v` query string (keys sorted ascending,
/// unencoded values) used by Upbit's `query_hash` and several vendor-native
/// HMAC signature inputs.
pub fn canonical_query_string(params: &[(&str, &str)]) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);
    sorted.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&")
}
