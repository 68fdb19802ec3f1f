//! Deterministic reference market data.
//!
//! Served by the aggregator when no CoinMarketCap credential is configured,
//! and by the mocked CoinMarketCap tier. Figures are denominated in USD.

use crate::{
    GlobalMetrics, MarketItem, Provider, ReliabilityTier, Snapshot, Symbol, ValidationError,
};

pub const REFERENCE_CURRENCY: &str = "USD";

// (symbol, name, price, change_24h %, market cap, 24h volume)
const LISTINGS: [(&str, &str, f64, f64, f64, f64); 10] = [
    ("BTC", "Bitcoin", 43_250.0, 2.35, 847_000_000_000.0, 24_100_000_000.0),
    ("ETH", "Ethereum", 2_280.5, -1.2, 274_000_000_000.0, 12_100_000_000.0),
    ("USDT", "Tether", 1.0, 0.01, 95_000_000_000.0, 45_000_000_000.0),
    ("BNB", "BNB", 312.4, 0.8, 48_000_000_000.0, 1_100_000_000.0),
    ("SOL", "Solana", 98.7, 12.4, 42_700_000_000.0, 3_200_000_000.0),
    ("XRP", "XRP", 0.62, -2.1, 33_800_000_000.0, 1_400_000_000.0),
    ("USDC", "USD Coin", 1.0, 0.0, 25_000_000_000.0, 5_600_000_000.0),
    ("ADA", "Cardano", 0.52, 3.4, 18_300_000_000.0, 490_000_000.0),
    ("AVAX", "Avalanche", 35.8, -16.2, 13_100_000_000.0, 870_000_000.0),
    ("DOGE", "Dogecoin", 0.085, 1.7, 12_100_000_000.0, 610_000_000.0),
];

pub fn reference_global() -> Result<GlobalMetrics, ValidationError> {
    GlobalMetrics::new(
        2_500_000_000_000.0,
        98_000_000_000.0,
        52.3,
        16.8,
        9_876,
        1.8,
        REFERENCE_CURRENCY,
    )
}

/// Top `limit` reference listings in rank order.
pub fn reference_listings(limit: usize) -> Result<Vec<MarketItem>, ValidationError> {
    LISTINGS
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, (symbol, name, price, change, market_cap, volume))| {
            MarketItem::new(
                Symbol::crypto(symbol)?,
                *name,
                Some(index as u32 + 1),
                *price,
                *change,
                Some(*market_cap),
                Some(*volume),
                REFERENCE_CURRENCY,
            )
        })
        .collect()
}

/// Full reference snapshot, attributed to the mocked CoinMarketCap tier.
///
/// Fails with [`ValidationError::CurrencyMismatch`] for any currency other
/// than USD, because the figures are not converted.
pub fn reference_snapshot(currency: &str, limit: usize) -> Result<Snapshot, ValidationError> {
    let requested = crate::validate_currency_code(currency)?;
    if requested != REFERENCE_CURRENCY {
        return Err(ValidationError::CurrencyMismatch {
            context: String::from("reference snapshot"),
            expected: requested,
            found: REFERENCE_CURRENCY.to_owned(),
        });
    }

    let provider = Provider::coinmarketcap(ReliabilityTier::Mocked);
    Snapshot::builder(requested)
        .global(reference_global()?, &provider)
        .items(reference_listings(limit)?, &provider)
        .build()
}
