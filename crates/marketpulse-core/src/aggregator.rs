//! Multi-provider snapshot aggregation.
//!
//! A snapshot needs two independent sub-calls, global metrics and top
//! listings. Both are issued concurrently; either failing fails the whole
//! snapshot, so no partial snapshot is ever assembled from a live feed.
//!
//! Without a CoinMarketCap credential the aggregator is built on the
//! [`SnapshotFeed::Reference`] branch and serves the deterministic reference
//! data set, reporting the missing credential as a warning.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::data_source::{DataSource, SourceError, SourceFuture};
use crate::{PipelineError, Snapshot, ValidationError};

pub use crate::reference::reference_snapshot;

pub const GLOBAL_METRICS_CALL: &str = "global_metrics";
pub const LISTINGS_CALL: &str = "listings";

/// Where snapshot data comes from, fixed when the aggregator is built.
#[derive(Clone)]
pub enum SnapshotFeed {
    Live(Arc<dyn DataSource>),
    Reference,
}

impl Debug for SnapshotFeed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live(source) => f
                .debug_tuple("Live")
                .field(&source.provider().id)
                .finish(),
            Self::Reference => f.write_str("Reference"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorOptions {
    pub currency: String,
    pub listing_limit: usize,
    pub timeout: Duration,
}

impl AggregatorOptions {
    pub fn new(currency: &str, listing_limit: usize) -> Result<Self, ValidationError> {
        Ok(Self {
            currency: crate::validate_currency_code(currency)?,
            listing_limit,
            timeout: Duration::from_millis(crate::config::DEFAULT_TIMEOUT_MS),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            currency: config.currency.clone(),
            listing_limit: config.listing_limit,
            timeout: config.request_timeout,
        }
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

/// A snapshot plus the non-fatal conditions met while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedSnapshot {
    pub snapshot: Snapshot,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MarketAggregator {
    feed: SnapshotFeed,
    options: AggregatorOptions,
}

impl MarketAggregator {
    pub fn live(source: Arc<dyn DataSource>, options: AggregatorOptions) -> Self {
        Self {
            feed: SnapshotFeed::Live(source),
            options,
        }
    }

    pub fn reference(options: AggregatorOptions) -> Self {
        Self {
            feed: SnapshotFeed::Reference,
            options,
        }
    }

    /// Live when a credential is configured or mocks are requested, reference otherwise.
    pub fn from_config(config: &PipelineConfig, source: Arc<dyn DataSource>) -> Self {
        let options = AggregatorOptions::from_config(config);
        if config.use_mock || config.coinmarketcap_api_key.is_some() {
            Self::live(source, options)
        } else {
            Self::reference(options)
        }
    }

    pub fn feed(&self) -> &SnapshotFeed {
        &self.feed
    }

    pub fn options(&self) -> &AggregatorOptions {
        &self.options
    }

    pub async fn snapshot(&self) -> Result<AggregatedSnapshot, PipelineError> {
        match &self.feed {
            SnapshotFeed::Live(source) => {
                let snapshot = self.live_snapshot(source.as_ref()).await?;
                Ok(AggregatedSnapshot {
                    snapshot,
                    warnings: Vec::new(),
                })
            }
            SnapshotFeed::Reference => {
                let missing = PipelineError::ConfigurationMissing {
                    what: String::from("coinmarketcap api key; serving reference snapshot"),
                };
                warn!(code = missing.code(), "{missing}");
                let snapshot =
                    reference_snapshot(&self.options.currency, self.options.listing_limit)?;
                Ok(AggregatedSnapshot {
                    snapshot,
                    warnings: vec![missing.to_string()],
                })
            }
        }
    }

    async fn live_snapshot(&self, source: &dyn DataSource) -> Result<Snapshot, PipelineError> {
        let provider = *source.provider();
        let currency = self.options.currency.as_str();
        let timeout = self.options.timeout;
        let timeout_ms = self.options.timeout_ms();

        debug!(provider = %provider.id, currency, "fetching snapshot sub-calls");
        let (global, listings) = tokio::join!(
            bounded(timeout, source.global_metrics(currency)),
            bounded(timeout, source.listings(currency, self.options.listing_limit)),
        );

        let global = global.map_err(|error| {
            PipelineError::upstream(provider.id, GLOBAL_METRICS_CALL, error, timeout_ms)
        })?;
        let items = listings.map_err(|error| {
            PipelineError::upstream(provider.id, LISTINGS_CALL, error, timeout_ms)
        })?;

        ensure_currency(currency, &global.currency, GLOBAL_METRICS_CALL)?;
        for item in &items {
            ensure_currency(currency, &item.currency, LISTINGS_CALL)?;
        }

        let snapshot = Snapshot::builder(currency)
            .global(global, &provider)
            .items(items, &provider)
            .build()?;
        Ok(snapshot)
    }
}

async fn bounded<T>(timeout: Duration, call: SourceFuture<'_, T>) -> Result<T, SourceError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::timeout(format!(
            "sub-call exceeded {}ms",
            timeout.as_millis()
        ))),
    }
}

fn ensure_currency(expected: &str, found: &str, context: &str) -> Result<(), ValidationError> {
    if expected.eq_ignore_ascii_case(found) {
        return Ok(());
    }
    Err(ValidationError::CurrencyMismatch {
        context: context.to_owned(),
        expected: expected.to_owned(),
        found: found.to_owned(),
    })
}
