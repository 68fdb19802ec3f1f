use std::sync::Arc;

use serde::Deserialize;

use crate::data_source::{DataSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::{Provider, ReliabilityTier, StockQuote, Symbol, UtcDateTime, ValidationError};

const ENDPOINT: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage `GLOBAL_QUOTE` adapter supporting both real API calls and mock mode.
#[derive(Clone)]
pub struct AlphaVantageAdapter {
    provider: Provider,
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    timeout_ms: u64,
}

impl Default for AlphaVantageAdapter {
    fn default() -> Self {
        Self::mocked()
    }
}

impl AlphaVantageAdapter {
    /// Deterministic quotes derived from the symbol, no network.
    pub fn mocked() -> Self {
        Self {
            provider: Provider::alphavantage(ReliabilityTier::Mocked),
            http_client: Arc::new(NoopHttpClient),
            api_key: String::new(),
            timeout_ms: 5_000,
        }
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        let tier = if http_client.is_mock() {
            ReliabilityTier::Mocked
        } else {
            ReliabilityTier::Production
        };
        Self {
            provider: Provider::alphavantage(tier),
            http_client,
            api_key: api_key.into(),
            timeout_ms: 5_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn is_real_client(&self) -> bool {
        self.provider.tier == ReliabilityTier::Production
    }

    async fn fetch_real_quote(&self, symbol: &Symbol) -> Result<StockQuote, SourceError> {
        let request = HttpRequest::get(ENDPOINT)
            .with_query([
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| error.into_source_error("alphavantage"))?;

        if !response.is_success() {
            return Err(response.status_error("alphavantage"));
        }

        parse_global_quote(symbol, &response.body)
    }

    fn fetch_mock_quote(&self, symbol: &Symbol) -> Result<StockQuote, SourceError> {
        let seed = symbol_seed(symbol);
        let price = 40.0 + (seed % 4_600) as f64 / 10.0;
        // Spread mock moves across roughly -20%..+20% so alert rules have something to fire on.
        let change_percent = ((seed / 7) % 401) as f64 / 10.0 - 20.0;
        let previous_close = price / (1.0 + change_percent / 100.0);

        StockQuote::new(
            symbol.clone(),
            round_cents(price),
            round_cents(price - previous_close),
            change_percent,
            Some(250_000 + seed % 4_750_000),
            "USD",
            UtcDateTime::now(),
        )
        .map_err(validation_to_error)
    }
}

impl DataSource for AlphaVantageAdapter {
    fn provider(&self) -> &Provider {
        &self.provider
    }

    fn quote<'a>(&'a self, symbol: Symbol) -> SourceFuture<'a, StockQuote> {
        Box::pin(async move {
            if self.is_real_client() {
                if self.api_key.trim().is_empty() {
                    return Err(SourceError::invalid_request(
                        "alphavantage quote request requires an api key",
                    ));
                }
                self.fetch_real_quote(&symbol).await
            } else {
                self.fetch_mock_quote(&symbol)
            }
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct AlphaVantageQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    quote: Option<AlphaVantageQuoteData>,
    #[serde(rename = "Note", default)]
    note: Option<String>,
    #[serde(rename = "Information", default)]
    information: Option<String>,
    #[serde(rename = "Error Message", default)]
    error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AlphaVantageQuoteData {
    #[serde(rename = "05. price", default)]
    price: Option<String>,
    #[serde(rename = "06. volume", default)]
    volume: Option<String>,
    #[serde(rename = "07. latest trading day", default)]
    latest_trading_day: Option<String>,
    #[serde(rename = "09. change", default)]
    change: Option<String>,
    #[serde(rename = "10. change percent", default)]
    change_percent: Option<String>,
}

fn parse_global_quote(symbol: &Symbol, body: &str) -> Result<StockQuote, SourceError> {
    let response: AlphaVantageQuoteResponse = serde_json::from_str(body).map_err(|e| {
        SourceError::internal(format!("failed to parse alphavantage response: {e}"))
    })?;

    // Quota exhaustion comes back as HTTP 200 with a `Note` or `Information` body.
    if let Some(note) = response.note.or(response.information) {
        return Err(SourceError::rate_limited(format!("alphavantage: {note}")));
    }
    if let Some(message) = response.error_message {
        return Err(SourceError::invalid_request(format!("alphavantage: {message}")));
    }

    let data = response
        .quote
        .filter(|data| data.price.is_some())
        .ok_or_else(|| {
            SourceError::invalid_request(format!("alphavantage has no quote for {symbol}"))
        })?;

    let price = parse_number("05. price", data.price.as_deref())?;
    let change = parse_number("09. change", data.change.as_deref())?;
    let change_percent = parse_number(
        "10. change percent",
        data.change_percent
            .as_deref()
            .map(|value| value.trim_end_matches('%')),
    )?;
    let volume = data
        .volume
        .as_deref()
        .and_then(|value| value.trim().parse::<u64>().ok());
    let as_of = match data.latest_trading_day.as_deref() {
        Some(day) => UtcDateTime::parse_date(day).map_err(validation_to_error)?,
        None => UtcDateTime::now(),
    };

    StockQuote::new(
        symbol.clone(),
        price,
        change,
        change_percent,
        volume,
        "USD",
        as_of,
    )
    .map_err(validation_to_error)
}

fn parse_number(field: &str, value: Option<&str>) -> Result<f64, SourceError> {
    value
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .ok_or_else(|| SourceError::internal(format!("alphavantage field '{field}' is not numeric")))
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(11_u64, |acc, byte| {
        acc.wrapping_mul(31).wrapping_add(byte as u64)
    })
}

fn validation_to_error(error: ValidationError) -> SourceError {
    SourceError::internal(error.to_string())
}
