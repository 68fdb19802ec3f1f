use serde::{Deserialize, Serialize};

use super::numeric::{
    validate_currency_code, validate_finite, validate_non_negative, validate_not_blank,
    validate_optional_non_negative,
};
use crate::{Symbol, UtcDateTime, ValidationError};

/// Latest stock quote as returned by a quotes provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: Symbol,
    pub price: f64,
    pub change: f64,
    /// Percent change versus previous close (`2.5` means +2.5%).
    pub change_percent: f64,
    pub volume: Option<u64>,
    pub currency: String,
    pub as_of: UtcDateTime,
}

impl StockQuote {
    pub fn new(
        symbol: Symbol,
        price: f64,
        change: f64,
        change_percent: f64,
        volume: Option<u64>,
        currency: impl AsRef<str>,
        as_of: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("price", price)?;
        validate_finite("change", change)?;
        validate_finite("change_percent", change_percent)?;

        Ok(Self {
            symbol,
            price,
            change,
            change_percent,
            volume,
            currency: validate_currency_code(currency.as_ref())?,
            as_of,
        })
    }

    /// Projects the quote into the snapshot item shape used by alerts and reports.
    pub fn to_market_item(&self) -> MarketItem {
        MarketItem {
            symbol: self.symbol.clone(),
            name: self.symbol.as_str().to_owned(),
            rank: None,
            price: self.price,
            change_24h: self.change_percent,
            market_cap: None,
            volume_24h: self.volume.map(|volume| volume as f64),
            currency: self.currency.clone(),
        }
    }
}

/// One listed asset inside a snapshot's `items` sub-view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketItem {
    pub symbol: Symbol,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    pub price: f64,
    /// Percent change over the last 24 hours.
    pub change_24h: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<f64>,
    pub currency: String,
}

impl MarketItem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: Symbol,
        name: impl Into<String>,
        rank: Option<u32>,
        price: f64,
        change_24h: f64,
        market_cap: Option<f64>,
        volume_24h: Option<f64>,
        currency: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_not_blank("name", &name)?;
        validate_non_negative("price", price)?;
        validate_finite("change_24h", change_24h)?;
        validate_optional_non_negative("market_cap", market_cap)?;
        validate_optional_non_negative("volume_24h", volume_24h)?;

        Ok(Self {
            symbol,
            name,
            rank,
            price,
            change_24h,
            market_cap,
            volume_24h,
            currency: validate_currency_code(currency.as_ref())?,
        })
    }
}

/// Market-wide metrics for the snapshot's `global` sub-view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalMetrics {
    pub total_market_cap: f64,
    pub total_volume_24h: f64,
    /// Bitcoin share of total market cap, in percent.
    pub btc_dominance: f64,
    pub eth_dominance: f64,
    pub active_cryptocurrencies: u32,
    pub market_cap_change_24h: f64,
    pub currency: String,
}

impl GlobalMetrics {
    pub fn new(
        total_market_cap: f64,
        total_volume_24h: f64,
        btc_dominance: f64,
        eth_dominance: f64,
        active_cryptocurrencies: u32,
        market_cap_change_24h: f64,
        currency: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("total_market_cap", total_market_cap)?;
        validate_non_negative("total_volume_24h", total_volume_24h)?;
        validate_non_negative("btc_dominance", btc_dominance)?;
        validate_non_negative("eth_dominance", eth_dominance)?;
        validate_finite("market_cap_change_24h", market_cap_change_24h)?;

        Ok(Self {
            total_market_cap,
            total_volume_24h,
            btc_dominance,
            eth_dominance,
            active_cryptocurrencies,
            market_cap_change_24h,
            currency: validate_currency_code(currency.as_ref())?,
        })
    }
}

/// Registration availability for one domain name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainAvailability {
    pub domain: String,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub currency: String,
}

impl DomainAvailability {
    pub fn new(
        domain: impl Into<String>,
        available: bool,
        price: Option<f64>,
        currency: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let domain = domain.into();
        validate_not_blank("domain", &domain)?;
        validate_optional_non_negative("price", price)?;

        Ok(Self {
            domain: domain.trim().to_ascii_lowercase(),
            available,
            price,
            currency: validate_currency_code(currency.as_ref())?,
        })
    }
}
