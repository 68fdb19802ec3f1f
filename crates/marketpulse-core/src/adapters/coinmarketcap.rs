use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::data_source::{DataSource, SourceError, SourceFuture};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, HttpResponse, NoopHttpClient};
use crate::reference::{reference_global, reference_listings};
use crate::{GlobalMetrics, MarketItem, Provider, ReliabilityTier, Symbol, ValidationError};

const BASE_URL: &str = "https://pro-api.coinmarketcap.com/v1";

/// CoinMarketCap adapter for global metrics and top listings.
///
/// The mocked tier serves the reference data set, which is always USD.
#[derive(Clone)]
pub struct CoinMarketCapAdapter {
    provider: Provider,
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    timeout_ms: u64,
}

impl Default for CoinMarketCapAdapter {
    fn default() -> Self {
        Self::mocked()
    }
}

impl CoinMarketCapAdapter {
    pub fn mocked() -> Self {
        Self {
            provider: Provider::coinmarketcap(ReliabilityTier::Mocked),
            http_client: Arc::new(NoopHttpClient),
            auth: HttpAuth::None,
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
            provider: Provider::coinmarketcap(tier),
            http_client,
            auth: HttpAuth::Header {
                name: String::from("X-CMC_PRO_API_KEY"),
                value: api_key.into(),
            },
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

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<HttpResponse, SourceError> {
        let request = HttpRequest::get(format!("{BASE_URL}{path}"))
            .with_query(query.iter().copied())
            .with_header("accept", "application/json")
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| error.into_source_error("coinmarketcap"))?;

        if !response.is_success() {
            return Err(response.status_error("coinmarketcap"));
        }
        Ok(response)
    }

    async fn fetch_real_global(&self, currency: &str) -> Result<GlobalMetrics, SourceError> {
        let response = self
            .get("/global-metrics/quotes/latest", &[("convert", currency)])
            .await?;
        parse_global_metrics(currency, &response.body)
    }

    async fn fetch_real_listings(
        &self,
        currency: &str,
        limit: usize,
    ) -> Result<Vec<MarketItem>, SourceError> {
        let limit = limit.to_string();
        let response = self
            .get(
                "/cryptocurrency/listings/latest",
                &[("start", "1"), ("limit", limit.as_str()), ("convert", currency)],
            )
            .await?;
        parse_listings(currency, &response.body)
    }
}

impl DataSource for CoinMarketCapAdapter {
    fn provider(&self) -> &Provider {
        &self.provider
    }

    fn global_metrics<'a>(&'a self, currency: &'a str) -> SourceFuture<'a, GlobalMetrics> {
        Box::pin(async move {
            if self.is_real_client() {
                self.fetch_real_global(currency).await
            } else {
                reference_global().map_err(validation_to_error)
            }
        })
    }

    fn listings<'a>(&'a self, currency: &'a str, limit: usize) -> SourceFuture<'a, Vec<MarketItem>> {
        Box::pin(async move {
            if limit == 0 {
                return Err(SourceError::invalid_request(
                    "coinmarketcap listings limit must be greater than zero",
                ));
            }

            if self.is_real_client() {
                self.fetch_real_listings(currency, limit).await
            } else {
                reference_listings(limit).map_err(validation_to_error)
            }
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CmcEnvelope<T> {
    #[serde(default)]
    status: Option<CmcStatus>,
    data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
struct CmcStatus {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CmcGlobalData {
    btc_dominance: f64,
    eth_dominance: f64,
    active_cryptocurrencies: u32,
    quote: BTreeMap<String, CmcGlobalQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct CmcGlobalQuote {
    total_market_cap: f64,
    total_volume_24h: f64,
    #[serde(default)]
    total_market_cap_yesterday_percentage_change: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct CmcListing {
    name: String,
    symbol: String,
    #[serde(default)]
    cmc_rank: Option<u32>,
    quote: BTreeMap<String, CmcListingQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct CmcListingQuote {
    price: Option<f64>,
    #[serde(default)]
    volume_24h: Option<f64>,
    #[serde(default)]
    percent_change_24h: Option<f64>,
    #[serde(default)]
    market_cap: Option<f64>,
}

fn unwrap_envelope<T>(body: &str) -> Result<T, SourceError>
where
    T: for<'de> Deserialize<'de>,
{
    let envelope: CmcEnvelope<T> = serde_json::from_str(body).map_err(|e| {
        SourceError::internal(format!("failed to parse coinmarketcap response: {e}"))
    })?;

    if let Some(status) = envelope.status {
        if status.error_code != 0 {
            let message = status
                .error_message
                .unwrap_or_else(|| format!("error code {}", status.error_code));
            return Err(SourceError::unavailable(format!("coinmarketcap: {message}")));
        }
    }

    envelope
        .data
        .ok_or_else(|| SourceError::internal("coinmarketcap response has no data"))
}

/// Picks the quote in the requested currency, or the first one present so
/// that a currency mismatch surfaces downstream instead of being masked.
fn select_quote<T>(quote: BTreeMap<String, T>, currency: &str) -> Option<(String, T)> {
    let mut quote = quote;
    let key = quote
        .keys()
        .find(|key| key.eq_ignore_ascii_case(currency))
        .or_else(|| quote.keys().next())
        .cloned()?;
    quote.remove(&key).map(|value| (key, value))
}

fn parse_global_metrics(currency: &str, body: &str) -> Result<GlobalMetrics, SourceError> {
    let data: CmcGlobalData = unwrap_envelope(body)?;
    let (quote_currency, quote) = select_quote(data.quote, currency)
        .ok_or_else(|| SourceError::internal("coinmarketcap global metrics have no quote"))?;

    GlobalMetrics::new(
        quote.total_market_cap,
        quote.total_volume_24h,
        data.btc_dominance,
        data.eth_dominance,
        data.active_cryptocurrencies,
        quote.total_market_cap_yesterday_percentage_change.unwrap_or(0.0),
        quote_currency,
    )
    .map_err(validation_to_error)
}

fn parse_listings(currency: &str, body: &str) -> Result<Vec<MarketItem>, SourceError> {
    let listings: Vec<CmcListing> = unwrap_envelope(body)?;

    listings
        .into_iter()
        .map(|listing| {
            let (quote_currency, quote) = select_quote(listing.quote, currency).ok_or_else(|| {
                SourceError::internal(format!("coinmarketcap listing {} has no quote", listing.symbol))
            })?;
            let price = quote.price.ok_or_else(|| {
                SourceError::internal(format!("coinmarketcap listing {} has no price", listing.symbol))
            })?;

            MarketItem::new(
                Symbol::crypto(&listing.symbol).map_err(validation_to_error)?,
                listing.name,
                listing.cmc_rank,
                price,
                quote.percent_change_24h.unwrap_or(0.0),
                quote.market_cap,
                quote.volume_24h,
                quote_currency,
            )
            .map_err(validation_to_error)
        })
        .collect()
}

fn validation_to_error(error: ValidationError) -> SourceError {
    SourceError::internal(error.to_string())
}
