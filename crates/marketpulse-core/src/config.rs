//! Pipeline configuration.
//!
//! Credentials and tuning knobs are plain values threaded into constructors;
//! nothing below this module reads the process environment. Each setting is
//! looked up as `MARKETPULSE_<NAME>` first and, for provider credentials,
//! the provider's conventional variable name second.

use std::env;
use std::time::Duration;

use crate::adapters::DEFAULT_AVAILABILITY_SEED;
use crate::alerts::AlertRules;
use crate::{validate_currency_code, ValidationError};

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_LISTING_LIMIT: usize = 10;
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub alphavantage_api_key: Option<String>,
    pub coinmarketcap_api_key: Option<String>,
    pub currency: String,
    pub listing_limit: usize,
    pub request_timeout: Duration,
    pub quote_group_size: Option<usize>,
    pub quote_group_delay: Option<Duration>,
    pub alert_rules: AlertRules,
    pub availability_seed: u64,
    /// Serve every provider from its mocked tier, ignoring credentials.
    pub use_mock: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            alphavantage_api_key: None,
            coinmarketcap_api_key: None,
            currency: String::from(DEFAULT_CURRENCY),
            listing_limit: DEFAULT_LISTING_LIMIT,
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            quote_group_size: None,
            quote_group_delay: None,
            alert_rules: AlertRules::default(),
            availability_seed: DEFAULT_AVAILABILITY_SEED,
            use_mock: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        config.alphavantage_api_key = read("MARKETPULSE_ALPHAVANTAGE_API_KEY")
            .or_else(|| read("ALPHAVANTAGE_API_KEY"));
        config.coinmarketcap_api_key = read("MARKETPULSE_COINMARKETCAP_API_KEY")
            .or_else(|| read("COINMARKETCAP_API_KEY"));

        if let Some(currency) = read("MARKETPULSE_CURRENCY") {
            config = config.with_currency(&currency)?;
        }
        if let Some(value) = read("MARKETPULSE_LISTING_LIMIT") {
            config = config.with_listing_limit(parse_number("MARKETPULSE_LISTING_LIMIT", &value)?)?;
        }
        if let Some(value) = read("MARKETPULSE_TIMEOUT_MS") {
            config = config.with_timeout_ms(parse_number("MARKETPULSE_TIMEOUT_MS", &value)?)?;
        }
        if let Some(value) = read("MARKETPULSE_QUOTE_GROUP_SIZE") {
            config.quote_group_size = Some(parse_number("MARKETPULSE_QUOTE_GROUP_SIZE", &value)?);
        }
        if let Some(value) = read("MARKETPULSE_QUOTE_GROUP_DELAY_MS") {
            let millis: u64 = parse_number("MARKETPULSE_QUOTE_GROUP_DELAY_MS", &value)?;
            config.quote_group_delay = Some(Duration::from_millis(millis));
        }
        if let Some(value) = read("MARKETPULSE_AVAILABILITY_SEED") {
            config.availability_seed = parse_number("MARKETPULSE_AVAILABILITY_SEED", &value)?;
        }
        if let Some(value) = read("MARKETPULSE_MOCK") {
            config.use_mock = parse_flag("MARKETPULSE_MOCK", &value)?;
        }

        Ok(config)
    }

    pub fn with_alphavantage_key(mut self, key: impl Into<String>) -> Self {
        self.alphavantage_api_key = Some(key.into());
        self
    }

    pub fn with_coinmarketcap_key(mut self, key: impl Into<String>) -> Self {
        self.coinmarketcap_api_key = Some(key.into());
        self
    }

    pub fn with_currency(mut self, currency: &str) -> Result<Self, ValidationError> {
        self.currency = validate_currency_code(currency)?;
        Ok(self)
    }

    pub fn with_listing_limit(mut self, limit: usize) -> Result<Self, ValidationError> {
        if limit == 0 {
            return Err(ValidationError::InvalidConfig {
                name: "listing_limit",
                value: limit.to_string(),
                reason: "must be greater than zero",
            });
        }
        self.listing_limit = limit;
        Ok(self)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, ValidationError> {
        if timeout_ms == 0 {
            return Err(ValidationError::InvalidConfig {
                name: "timeout_ms",
                value: timeout_ms.to_string(),
                reason: "must be greater than zero",
            });
        }
        self.request_timeout = Duration::from_millis(timeout_ms);
        Ok(self)
    }

    pub fn with_quote_grouping(mut self, group_size: usize, group_delay: Duration) -> Self {
        self.quote_group_size = Some(group_size);
        self.quote_group_delay = Some(group_delay);
        self
    }

    pub fn with_alert_rules(mut self, alert_rules: AlertRules) -> Self {
        self.alert_rules = alert_rules;
        self
    }

    pub fn with_availability_seed(mut self, seed: u64) -> Self {
        self.availability_seed = seed;
        self
    }

    pub fn with_mock(mut self, use_mock: bool) -> Self {
        self.use_mock = use_mock;
        self
    }

    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ValidationError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ValidationError::InvalidConfig {
            name,
            value: value.to_owned(),
            reason: "expected a non-negative integer",
        })
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ValidationError::InvalidConfig {
            name,
            value: value.to_owned(),
            reason: "expected true or false",
        }),
    }
}
