//! Pipeline entry points.
//!
//! [`MarketPulse`] wires configuration, adapters and engines together and
//! wraps every result in an [`Envelope`] carrying a request id, the source
//! chain, latency and the freshness policy of the view it returns.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::{AlphaVantageAdapter, CoinMarketCapAdapter, FlippaAdapter, GoDaddyAdapter};
use crate::aggregator::{AggregatedSnapshot, MarketAggregator};
use crate::alerts::AlertEngine;
use crate::config::PipelineConfig;
use crate::data_source::{DataSource, SourceError};
use crate::envelope::{CachePolicy, Envelope, EnvelopeError, EnvelopeMeta};
use crate::fetcher::{ChunkedFetcher, FetchFailure};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::insight::{DigestInsightProducer, InsightError, InsightProducer};
use crate::provider_policy::ProviderPolicy;
use crate::ranking::{OpportunityFilter, Ranking, RankingEngine};
use crate::report::{Report, ReportMeta};
use crate::{
    Alert, DomainAvailability, Opportunity, PipelineError, Provider, ProviderId, Snapshot,
    StockQuote, Symbol,
};

/// Quotes fetched for a stock request, with the snapshot and alerts derived from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockQuotes {
    pub quotes: Vec<StockQuote>,
    pub snapshot: Snapshot,
    pub alerts: Vec<Alert>,
}

pub struct MarketPulseBuilder {
    config: PipelineConfig,
    http_client: Option<Arc<dyn HttpClient>>,
    stocks: Option<Arc<dyn DataSource>>,
    crypto: Option<Arc<dyn DataSource>>,
    opportunity_feeds: Option<Vec<Arc<dyn DataSource>>>,
    availability: Option<Arc<dyn DataSource>>,
    insight: Option<Arc<dyn InsightProducer>>,
}

impl MarketPulseBuilder {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            http_client: None,
            stocks: None,
            crypto: None,
            opportunity_feeds: None,
            availability: None,
            insight: None,
        }
    }

    pub fn http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn stock_source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.stocks = Some(source);
        self
    }

    pub fn crypto_source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.crypto = Some(source);
        self
    }

    pub fn opportunity_feeds(mut self, feeds: Vec<Arc<dyn DataSource>>) -> Self {
        self.opportunity_feeds = Some(feeds);
        self
    }

    pub fn availability_source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.availability = Some(source);
        self
    }

    pub fn insight_producer(mut self, producer: Arc<dyn InsightProducer>) -> Self {
        self.insight = Some(producer);
        self
    }

    pub fn build(self) -> MarketPulse {
        let config = self.config;
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));

        let stock_fallback = self.stocks.is_none()
            && !config.use_mock
            && config.alphavantage_api_key.is_none();
        let stocks = self
            .stocks
            .unwrap_or_else(|| stock_source(&config, &http_client));
        let crypto = self
            .crypto
            .unwrap_or_else(|| crypto_source(&config, &http_client));
        let aggregator = MarketAggregator::from_config(&config, crypto);

        let opportunity_feeds = self.opportunity_feeds.unwrap_or_else(|| {
            vec![
                Arc::new(FlippaAdapter::new()) as Arc<dyn DataSource>,
                Arc::new(GoDaddyAdapter::with_seed(config.availability_seed)),
            ]
        });
        let availability = self
            .availability
            .unwrap_or_else(|| Arc::new(GoDaddyAdapter::with_seed(config.availability_seed)));
        let insight = self
            .insight
            .unwrap_or_else(|| Arc::new(DigestInsightProducer::default()));

        MarketPulse {
            alerts: AlertEngine::new(config.alert_rules),
            config,
            stocks,
            stock_fallback,
            aggregator,
            opportunity_feeds,
            availability,
            insight,
        }
    }
}

fn stock_source(config: &PipelineConfig, http_client: &Arc<dyn HttpClient>) -> Arc<dyn DataSource> {
    match (&config.alphavantage_api_key, config.use_mock) {
        (Some(key), false) => Arc::new(
            AlphaVantageAdapter::with_http_client(Arc::clone(http_client), key.clone())
                .with_timeout_ms(config.timeout_ms()),
        ),
        _ => Arc::new(AlphaVantageAdapter::mocked()),
    }
}

fn crypto_source(config: &PipelineConfig, http_client: &Arc<dyn HttpClient>) -> Arc<dyn DataSource> {
    match (&config.coinmarketcap_api_key, config.use_mock) {
        (Some(key), false) => Arc::new(
            CoinMarketCapAdapter::with_http_client(Arc::clone(http_client), key.clone())
                .with_timeout_ms(config.timeout_ms()),
        ),
        _ => Arc::new(CoinMarketCapAdapter::mocked()),
    }
}

/// The pipeline service behind every CLI command.
pub struct MarketPulse {
    config: PipelineConfig,
    stocks: Arc<dyn DataSource>,
    stock_fallback: bool,
    aggregator: MarketAggregator,
    opportunity_feeds: Vec<Arc<dyn DataSource>>,
    availability: Arc<dyn DataSource>,
    insight: Arc<dyn InsightProducer>,
    alerts: AlertEngine,
}

impl MarketPulse {
    pub fn builder(config: PipelineConfig) -> MarketPulseBuilder {
        MarketPulseBuilder::new(config)
    }

    pub fn from_config(config: PipelineConfig) -> Self {
        MarketPulseBuilder::new(config).build()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn aggregator(&self) -> &MarketAggregator {
        &self.aggregator
    }

    /// Fetches quotes for `symbols` in rate-limited groups.
    ///
    /// Failed symbols become envelope errors; the call fails only when no
    /// symbol succeeds.
    pub async fn stock_quotes(
        &self,
        symbols: Vec<Symbol>,
    ) -> Result<Envelope<StockQuotes>, PipelineError> {
        let started = Instant::now();
        let provider = *self.stocks.provider();
        if symbols.is_empty() {
            return Err(crate::ValidationError::EmptyField { field: "symbols" }.into());
        }

        let fetcher = ChunkedFetcher::new(self.quote_policy(&provider));
        let source = Arc::clone(&self.stocks);
        let outcome = fetcher
            .fetch_all(symbols, |symbol| {
                let source = Arc::clone(&source);
                async move { source.quote(symbol).await }
            })
            .await;

        let (successes, failures) = outcome.into_parts();
        if successes.is_empty() {
            return Err(all_failed(provider.id, "quote", failures, self.config.timeout_ms()));
        }

        let quotes: Vec<StockQuote> = successes.into_iter().map(|success| success.value).collect();
        let snapshot = Snapshot::builder(self.config.currency.clone())
            .items(quotes.iter().map(StockQuote::to_market_item).collect(), &provider)
            .build()?;
        let alerts = self.alerts.evaluate(&snapshot);

        let mut warnings = Vec::new();
        if self.stock_fallback {
            warnings.push(
                PipelineError::ConfigurationMissing {
                    what: String::from("alphavantage api key; serving mocked quotes"),
                }
                .to_string(),
            );
        }
        let errors = failures.iter().map(|failure| unit_error(provider.id, failure)).collect();

        self.finish(
            "stocks",
            StockQuotes {
                quotes,
                snapshot,
                alerts,
            },
            vec![provider.id],
            started,
            CachePolicy::QUOTES,
            warnings,
            errors,
        )
    }

    pub async fn crypto_snapshot(&self) -> Result<Envelope<Snapshot>, PipelineError> {
        let started = Instant::now();
        let AggregatedSnapshot { snapshot, warnings } = self.aggregator.snapshot().await?;
        let chain = snapshot.data_sources();

        self.finish(
            "crypto",
            snapshot,
            chain,
            started,
            CachePolicy::CRYPTO_SNAPSHOT,
            warnings,
            Vec::new(),
        )
    }

    pub async fn alerts(&self) -> Result<Envelope<Vec<Alert>>, PipelineError> {
        let started = Instant::now();
        let AggregatedSnapshot { snapshot, warnings } = self.aggregator.snapshot().await?;
        let alerts = self.alerts.evaluate(&snapshot);

        self.finish(
            "alerts",
            alerts,
            snapshot.data_sources(),
            started,
            CachePolicy::ALERTS,
            warnings,
            Vec::new(),
        )
    }

    /// Ranks opportunities from every configured feed.
    ///
    /// Feeds are queried concurrently; a failing feed is reported as an
    /// envelope error while the remaining candidates are still ranked.
    pub async fn opportunities(
        &self,
        filter: &OpportunityFilter,
        limit: Option<usize>,
    ) -> Result<Envelope<Ranking>, PipelineError> {
        let started = Instant::now();
        let timeout = self.config.request_timeout;
        let keyword = match filter.keywords.as_slice() {
            [single] => Some(single.as_str()),
            _ => None,
        };

        let calls = self.opportunity_feeds.iter().map(|feed| async move {
            let result = match tokio::time::timeout(timeout, feed.opportunities(keyword)).await {
                Ok(result) => result,
                Err(_) => Err(SourceError::timeout(format!(
                    "opportunity feed exceeded {}ms",
                    timeout.as_millis()
                ))),
            };
            (feed.provider().id, result)
        });

        let mut candidates: Vec<Opportunity> = Vec::new();
        let mut chain = Vec::new();
        let mut failures = Vec::new();
        for (provider, result) in join_all(calls).await {
            match result {
                Ok(batch) => {
                    candidates.extend(batch);
                    chain.push(provider);
                }
                Err(error) => {
                    warn!(provider = %provider, code = error.code(), "opportunity feed failed: {}", error.message());
                    failures.push((provider, error));
                }
            }
        }

        if chain.is_empty() {
            return Err(match failures.into_iter().next() {
                Some((provider, error)) => {
                    PipelineError::upstream(provider, "opportunities", error, self.config.timeout_ms())
                }
                None => PipelineError::ConfigurationMissing {
                    what: String::from("no opportunity feeds configured"),
                },
            });
        }

        let mut engine = RankingEngine::default();
        if let Some(limit) = limit {
            engine = engine.with_limit(limit);
        }
        let ranking = engine.rank(&candidates, filter);
        let errors = failures
            .iter()
            .map(|(provider, error)| source_error(*provider, error))
            .collect();

        self.finish(
            "opportunities",
            ranking,
            chain,
            started,
            CachePolicy::OPPORTUNITIES,
            Vec::new(),
            errors,
        )
    }

    pub async fn domain_availability(
        &self,
        domains: Vec<String>,
    ) -> Result<Envelope<Vec<DomainAvailability>>, PipelineError> {
        let started = Instant::now();
        let provider = *self.availability.provider();
        if domains.is_empty() {
            return Err(crate::ValidationError::EmptyField { field: "domains" }.into());
        }

        let policy = ProviderPolicy::from_provider(&provider).with_timeout(self.config.request_timeout);
        let source = Arc::clone(&self.availability);
        let outcome = ChunkedFetcher::new(policy)
            .fetch_all(domains, |domain| {
                let source = Arc::clone(&source);
                async move { source.availability(domain).await }
            })
            .await;

        let (successes, failures) = outcome.into_parts();
        if successes.is_empty() {
            return Err(all_failed(provider.id, "availability", failures, self.config.timeout_ms()));
        }

        let results = successes.into_iter().map(|success| success.value).collect();
        let errors = failures.iter().map(|failure| unit_error(provider.id, failure)).collect();

        self.finish(
            "domains",
            results,
            vec![provider.id],
            started,
            CachePolicy::AVAILABILITY,
            Vec::new(),
            errors,
        )
    }

    /// Composes snapshot, insight and alerts into one report.
    ///
    /// A failing insight producer does not fail the report; the report is
    /// returned without insight and the failure becomes a warning.
    pub async fn report(&self) -> Result<Envelope<Report>, PipelineError> {
        let started = Instant::now();
        let AggregatedSnapshot {
            snapshot,
            mut warnings,
        } = self.aggregator.snapshot().await?;

        let produced = tokio::time::timeout(self.config.request_timeout, self.insight.produce(&snapshot))
            .await
            .unwrap_or(Err(InsightError::TimedOut {
                timeout_ms: self.config.timeout_ms(),
            }));
        let insight = match produced {
            Ok(insight) => Some(insight),
            Err(error) => {
                warn!(producer = self.insight.name(), "insight unavailable: {error}");
                warnings.push(format!("insight unavailable: {error}"));
                None
            }
        };
        let alerts = self.alerts.evaluate(&snapshot);
        let chain = snapshot.data_sources();
        let meta = ReportMeta::generate(chain.clone(), elapsed_ms(started));
        let report = Report::new(meta, snapshot, insight, alerts);
        report.validate()?;

        self.finish(
            "report",
            report,
            chain,
            started,
            CachePolicy::REPORT,
            warnings,
            Vec::new(),
        )
    }

    /// Descriptors of every provider this pipeline is wired to.
    pub fn sources(&self) -> Result<Envelope<Vec<Provider>>, PipelineError> {
        let started = Instant::now();
        let mut providers = vec![*self.stocks.provider()];
        match self.aggregator.feed() {
            crate::aggregator::SnapshotFeed::Live(source) => providers.push(*source.provider()),
            crate::aggregator::SnapshotFeed::Reference => providers.push(Provider::coinmarketcap(
                crate::ReliabilityTier::Mocked,
            )),
        }
        providers.extend(self.opportunity_feeds.iter().map(|feed| *feed.provider()));
        providers.push(*self.availability.provider());

        let mut seen = Vec::new();
        providers.retain(|provider| {
            if seen.contains(&provider.id) {
                return false;
            }
            seen.push(provider.id);
            true
        });

        self.finish(
            "sources",
            providers,
            seen,
            started,
            CachePolicy::NONE,
            Vec::new(),
            Vec::new(),
        )
    }

    fn quote_policy(&self, provider: &Provider) -> ProviderPolicy {
        let mut policy = ProviderPolicy::from_provider(provider).with_timeout(self.config.request_timeout);
        if let Some(group_size) = self.config.quote_group_size {
            policy = policy.with_group_size(group_size);
        }
        if let Some(group_delay) = self.config.quote_group_delay {
            policy = policy.with_group_delay(group_delay);
        }
        policy
    }

    #[allow(clippy::too_many_arguments)]
    fn finish<T>(
        &self,
        operation: &'static str,
        data: T,
        source_chain: Vec<ProviderId>,
        started: Instant,
        cache: CachePolicy,
        warnings: Vec<String>,
        errors: Vec<EnvelopeError>,
    ) -> Result<Envelope<T>, PipelineError> {
        let latency_ms = elapsed_ms(started);
        let meta = EnvelopeMeta::new(uuid::Uuid::new_v4().to_string(), source_chain, latency_ms, cache)?
            .with_warnings(warnings);

        info!(
            operation,
            request_id = %meta.request_id,
            latency_ms,
            errors = errors.len(),
            warnings = meta.warnings.len(),
            "entry point completed"
        );

        Envelope::with_errors(meta, data, errors).map_err(PipelineError::from)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn source_error(provider: ProviderId, error: &SourceError) -> EnvelopeError {
    EnvelopeError::from_parts(error.code(), error.to_string())
        .with_retryable(error.retryable())
        .with_source(provider)
}

fn unit_error<P: std::fmt::Display>(provider: ProviderId, failure: &FetchFailure<P>) -> EnvelopeError {
    EnvelopeError::from_parts(
        failure.error.code(),
        format!("{}: {}", failure.param, failure.error.message()),
    )
    .with_retryable(failure.error.retryable())
    .with_source(provider)
}

fn all_failed<P>(
    provider: ProviderId,
    sub_call: &'static str,
    failures: Vec<FetchFailure<P>>,
    timeout_ms: u64,
) -> PipelineError {
    match failures.into_iter().next() {
        Some(failure) => PipelineError::upstream(provider, sub_call, failure.error, timeout_ms),
        None => PipelineError::UpstreamFailure {
            provider,
            sub_call,
            source: SourceError::internal("no results"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::NoopHttpClient;
    use crate::ErrorKind;

    fn pipeline(config: PipelineConfig) -> MarketPulse {
        MarketPulse::builder(config)
            .http_client(Arc::new(NoopHttpClient))
            .build()
    }

    #[tokio::test]
    async fn crypto_snapshot_without_key_uses_reference_with_warning() {
        let envelope = pipeline(PipelineConfig::default())
            .crypto_snapshot()
            .await
            .expect("snapshot");

        assert_eq!(envelope.meta.source_chain, vec![ProviderId::Coinmarketcap]);
        assert_eq!(envelope.meta.cache, CachePolicy::CRYPTO_SNAPSHOT);
        assert_eq!(envelope.meta.warnings.len(), 1);
        assert_eq!(envelope.data.items().len(), 10);
    }

    #[tokio::test]
    async fn report_carries_digest_insight_and_alerts() {
        let envelope = pipeline(PipelineConfig::default().with_mock(true))
            .report()
            .await
            .expect("report");

        let report = envelope.data;
        assert!(report.insight.is_some());
        assert_eq!(report.alerts.len(), 2);
        assert_eq!(report.meta.data_sources, vec![ProviderId::Coinmarketcap]);
    }

    #[tokio::test]
    async fn empty_symbol_list_is_a_validation_failure() {
        let error = pipeline(PipelineConfig::default().with_mock(true))
            .stock_quotes(Vec::new())
            .await
            .expect_err("empty");

        assert_eq!(error.kind(), ErrorKind::ValidationFailure);
    }

    #[tokio::test]
    async fn stock_quotes_in_a_foreign_currency_fail_validation() {
        let config = PipelineConfig::default()
            .with_mock(true)
            .with_currency("EUR")
            .expect("valid currency");

        let error = pipeline(config)
            .stock_quotes(vec![Symbol::stock("AAPL").expect("symbol")])
            .await
            .expect_err("USD quotes under an EUR configuration");

        assert_eq!(error.kind(), ErrorKind::ValidationFailure);
        assert!(error.to_string().contains("EUR"));
    }

    #[tokio::test]
    async fn stock_snapshot_uses_the_configured_currency() {
        let envelope = pipeline(PipelineConfig::default().with_mock(true))
            .stock_quotes(vec![Symbol::stock("MSFT").expect("symbol")])
            .await
            .expect("quotes");

        assert_eq!(envelope.data.snapshot.currency(), "USD");
    }

    #[test]
    fn sources_lists_each_provider_once() {
        let envelope = pipeline(PipelineConfig::default()).sources().expect("sources");

        let ids: Vec<ProviderId> = envelope.data.iter().map(|provider| provider.id).collect();
        assert_eq!(
            ids,
            vec![
                ProviderId::Alphavantage,
                ProviderId::Coinmarketcap,
                ProviderId::Flippa,
                ProviderId::Godaddy,
            ]
        );
    }
}
