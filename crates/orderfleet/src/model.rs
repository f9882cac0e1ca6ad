// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core data model: reservation orders, credentials, worker status, and the
//! event records streamed to subscribers.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A `BASE/QUOTE` trading pair in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub base: String,
    pub quote: String,
}

impl Symbol {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self { base: base.into().to_uppercase(), quote: quote.into().to_uppercase() }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for Symbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) =
            s.split_once('/').ok_or_else(|| format!("symbol not in BASE/QUOTE form: {s}"))?;
        if base.is_empty() || quote.is_empty() {
            return Err(format!("symbol not in BASE/QUOTE form: {s}"));
        }
        Ok(Self::new(base, quote))
    }
}

/// Supported trading venues. The Factory maps one of these (case-insensitive
/// at parse time) to a concrete `VenueAdapter`. `Unknown` carries the raw
/// venue name through unrecognized so the registry invariant ("every order
/// has a Worker") still holds: the Factory resolves it to a no-op adapter
/// rather than rejecting the order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VenueKind {
    Upbit,
    Bithumb,
    Binance,
    Bybit,
    Bitget,
    Okx,
    KuCoin,
    Gate,
    Huobi,
    Mexc,
    Coinone,
    Korbit,
    CoinbaseExchange,
    Unknown(String),
}

impl VenueKind {
    pub fn name(&self) -> String {
        match self {
            Self::Upbit => "upbit".to_owned(),
            Self::Bithumb => "bithumb".to_owned(),
            Self::Binance => "binance".to_owned(),
            Self::Bybit => "bybit".to_owned(),
            Self::Bitget => "bitget".to_owned(),
            Self::Okx => "okx".to_owned(),
            Self::KuCoin => "kucoin".to_owned(),
            Self::Gate => "gate".to_owned(),
            Self::Huobi => "huobi".to_owned(),
            Self::Mexc => "mexc".to_owned(),
            Self::Coinone => "coinone".to_owned(),
            Self::Korbit => "korbit".to_owned(),
            Self::CoinbaseExchange => "coinbase".to_owned(),
            Self::Unknown(raw) => raw.clone(),
        }
    }
}

impl fmt::Display for VenueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl Serialize for VenueKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for VenueKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(Self::Unknown(raw)))
    }
}

impl FromStr for VenueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upbit" => Ok(Self::Upbit),
            "bithumb" => Ok(Self::Bithumb),
            "binance" => Ok(Self::Binance),
            "bybit" => Ok(Self::Bybit),
            "bitget" => Ok(Self::Bitget),
            "okx" => Ok(Self::Okx),
            "kucoin" => Ok(Self::KuCoin),
            "gate" | "gate.io" | "gateio" => Ok(Self::Gate),
            "huobi" => Ok(Self::Huobi),
            "mexc" => Ok(Self::Mexc),
            "coinone" => Ok(Self::Coinone),
            "korbit" => Ok(Self::Korbit),
            "coinbase" | "coinbase_exchange" | "coinbaseexchange" => Ok(Self::CoinbaseExchange),
            other => Err(other.to_owned()),
        }
    }
}

/// A persistent user intent: post a fixed limit sell on a fixed cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationOrder {
    /// Unique per user.
    pub name: String,
    pub symbol: Symbol,
    pub price: Decimal,
    pub quantity: Decimal,
    /// Tick period in seconds; sub-second values are allowed.
    pub period_secs: f64,
    pub venue: VenueKind,
    pub credential_alias: String,
}

impl ReservationOrder {
    /// Tick period converted to milliseconds, floored, with a floor of 1ms.
    pub fn tick_period(&self) -> Duration {
        let ms = (self.period_secs * 1000.0).floor().max(1.0) as u64;
        Duration::from_millis(ms)
    }
}

/// Opaque venue credential material. Never logged verbatim: `Debug` redacts
/// the secret fields.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialBundle {
    pub access_key: String,
    pub secret_key: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub passphrase: Option<String>,
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Lifecycle state of a single Worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Snapshot of one Worker's mutable counters. Written only by the owning
/// Worker, under its own short-lived lock; read freely by snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatus {
    pub state: WorkerState,
    pub last_tick: Option<DateTime<Utc>>,
    pub last_price: Option<Decimal>,
    pub tick_count: u64,
    pub error_count: u64,
    pub last_error: Option<String>,
}

impl Default for WorkerStatus {
    fn default() -> Self {
        Self {
            state: WorkerState::Idle,
            last_tick: None,
            last_price: None,
            tick_count: 0,
            error_count: 0,
            last_error: None,
        }
    }
}

impl WorkerStatus {
    pub fn running(&self) -> bool {
        self.state == WorkerState::Running
    }
}

/// Which feed an `EventRecord` belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventCategory {
    OrderLog,
    SystemLog,
}

/// Severity of an `EventRecord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Success,
}

/// One tick outcome or system-level incident, broadcast exactly once and
/// retained in the owning Worker's bounded ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub category: EventCategory,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_name: Option<String>,
    pub venue: String,
    pub symbol: String,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl EventRecord {
    pub fn order_log(
        order_name: impl Into<String>,
        user_id: impl Into<String>,
        venue: impl Into<String>,
        symbol: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category: EventCategory::OrderLog,
            timestamp: Utc::now(),
            order_name: Some(order_name.into()),
            venue: venue.into(),
            symbol: symbol.into(),
            message: message.into(),
            severity,
            price: None,
            quantity: None,
            user_id: Some(user_id.into()),
        }
    }

    pub fn system_log(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            category: EventCategory::SystemLog,
            timestamp: Utc::now(),
            order_name: None,
            venue: String::new(),
            symbol: String::new(),
            message: message.into(),
            severity,
            price: None,
            quantity: None,
            user_id: None,
        }
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

/// Wire envelope written to every subscriber session.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope<'a> {
    pub category: EventCategory,
    pub data: &'a EventRecord,
}

impl<'a> EventEnvelope<'a> {
    pub fn new(record: &'a EventRecord) -> Self {
        Self { category: record.category, data: record }
    }
}
