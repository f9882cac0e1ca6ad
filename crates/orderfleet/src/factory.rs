// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps a `VenueKind` to a concrete `VenueAdapter`. Construction never
//! fails: an adapter that cannot be built from the shared HTTP client is
//! not a reachable state, and an unrecognized venue name resolves to the
//! no-op adapter rather than rejecting the order (spec.md §4.3).

use std::sync::Arc;

use crate::model::VenueKind;
use crate::venue::binance::BinanceAdapter;
use crate::venue::bitget::BitgetAdapter;
use crate::venue::bithumb::BithumbAdapter;
use crate::venue::bybit::BybitAdapter;
use crate::venue::coinbase_exchange::CoinbaseExchangeAdapter;
use crate::venue::coinone::CoinoneAdapter;
use crate::venue::gate::GateAdapter;
use crate::venue::huobi::HuobiAdapter;
use crate::venue::korbit::KorbitAdapter;
use crate::venue::kucoin::KucoinAdapter;
use crate::venue::mexc::MexcAdapter;
use crate::venue::noop::NoOpAdapter;
use crate::venue::okx::OkxAdapter;
use crate::venue::upbit::UpbitAdapter;
use crate::venue::VenueAdapter;

/// Builds one `VenueAdapter` per `VenueKind`, sharing a single `reqwest::Client`
/// (and therefore its connection pool and TLS config) across every worker.
pub struct VenueFactory {
    client: reqwest::Client,
}

impl VenueFactory {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn build(&self, kind: &VenueKind) -> Arc<dyn VenueAdapter> {
        let client = self.client.clone();
        match kind {
            VenueKind::Upbit => Arc::new(UpbitAdapter::new(client)),
            VenueKind::Bithumb => Arc::new(BithumbAdapter::new(client)),
            VenueKind::Binance => Arc::new(BinanceAdapter::new(client)),
            VenueKind::Bybit => Arc::new(BybitAdapter::new(client)),
            VenueKind::Bitget => Arc::new(BitgetAdapter::new(client)),
            VenueKind::Okx => Arc::new(OkxAdapter::new(client)),
            VenueKind::KuCoin => Arc::new(KucoinAdapter::new(client)),
            VenueKind::Gate => Arc::new(GateAdapter::new(client)),
            VenueKind::Huobi => Arc::new(HuobiAdapter::new(client)),
            VenueKind::Mexc => Arc::new(MexcAdapter::new(client)),
            VenueKind::Coinone => Arc::new(CoinoneAdapter::new(client)),
            VenueKind::Korbit => Arc::new(KorbitAdapter::new(client)),
            VenueKind::CoinbaseExchange => Arc::new(CoinbaseExchangeAdapter::new(client)),
            VenueKind::Unknown(name) => Arc::new(NoOpAdapter::new(name.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_an_adapter_for_every_venue_kind() {
        let factory = VenueFactory::new(reqwest::Client::new());
        for kind in [
            VenueKind::Upbit,
            VenueKind::Bithumb,
            VenueKind::Binance,
            VenueKind::Bybit,
            VenueKind::Bitget,
            VenueKind::Okx,
            VenueKind::KuCoin,
            VenueKind::Gate,
            VenueKind::Huobi,
            VenueKind::Mexc,
            VenueKind::Coinone,
            VenueKind::Korbit,
            VenueKind::CoinbaseExchange,
        ] {
            let adapter = factory.build(&kind);
            assert!(!adapter.normalize_symbol(&crate::model::Symbol::new("BTC", "USDT")).is_empty());
        }
    }

    #[tokio::test]
    async fn unknown_venue_resolves_to_a_no_op_adapter() {
        let factory = VenueFactory::new(reqwest::Client::new());
        let adapter = factory.build(&VenueKind::Unknown("made-up-venue".to_owned()));
        let symbol = crate::model::Symbol::new("BTC", "USDT");
        let credentials = crate::model::CredentialBundle {
            access_key: "ak".into(),
            secret_key: "sk".into(),
            passphrase: None,
        };
        let req = crate::venue::PlaceLimitSellRequest {
            symbol: &symbol,
            price: rust_decimal::Decimal::new(1, 0),
            quantity: rust_decimal::Decimal::new(1, 0),
            credentials: &credentials,
        };
        let err = adapter
            .place_limit_sell(req, std::time::Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::VenueError::NotImplemented(_)));
    }
}
