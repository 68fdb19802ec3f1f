//! Behavior-driven tests for the aggregation, scoring and reporting pipeline.
//!
//! These tests verify what a caller observes from the pipeline entry points,
//! using scripted data sources in place of live providers.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use marketpulse_core::{
    AggregatorOptions, AlertEngine, AlertKind, ChunkedFetcher, DataSource, ErrorKind, FlippaAdapter,
    GlobalMetrics, InsightError, InsightFuture, InsightProducer, MarketAggregator, MarketItem,
    MarketPulse, NoopHttpClient, Opportunity, OpportunityFilter, OpportunityInput,
    OpportunityKind, PipelineConfig, PipelineError, Priority, Provider, ProviderId,
    ProviderPolicy, RankingEngine, ReliabilityTier, Snapshot, SourceError, SourceFuture, StockQuote, Symbol,
    UtcDateTime,
};

// =============================================================================
// Scripted data sources
// =============================================================================

/// Quote source that fails for one symbol and tracks concurrency.
struct ScriptedQuotes {
    provider: Provider,
    failing: &'static str,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedQuotes {
    fn failing_on(failing: &'static str) -> Self {
        Self {
            provider: Provider::alphavantage(ReliabilityTier::Production),
            failing,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

impl DataSource for ScriptedQuotes {
    fn provider(&self) -> &Provider {
        &self.provider
    }

    fn quote<'a>(&'a self, symbol: Symbol) -> SourceFuture<'a, StockQuote> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if symbol.as_str() == self.failing {
                return Err(SourceError::unavailable(format!("no quote for {symbol}")));
            }
            StockQuote::new(symbol, 100.0, 1.0, 1.0, Some(1_000), "USD", UtcDateTime::now())
                .map_err(|error| SourceError::internal(error.to_string()))
        })
    }
}

#[derive(Clone, Copy)]
enum SubCall {
    Ok,
    Fail,
    Hang,
}

/// Market source whose two sub-calls can be made to fail or hang independently.
struct ScriptedMarket {
    provider: Provider,
    global: SubCall,
    listings: SubCall,
    currency: &'static str,
}

impl ScriptedMarket {
    fn new(global: SubCall, listings: SubCall) -> Self {
        Self {
            provider: Provider::coinmarketcap(ReliabilityTier::Production),
            global,
            listings,
            currency: "USD",
        }
    }
}

async fn scripted<T>(behavior: SubCall, value: impl FnOnce() -> T) -> Result<T, SourceError> {
    match behavior {
        SubCall::Ok => Ok(value()),
        SubCall::Fail => Err(SourceError::unavailable("status 502")),
        SubCall::Hang => {
            tokio::time::sleep(Duration::from_secs(3_600)).await;
            Ok(value())
        }
    }
}

impl DataSource for ScriptedMarket {
    fn provider(&self) -> &Provider {
        &self.provider
    }

    fn global_metrics<'a>(&'a self, _currency: &'a str) -> SourceFuture<'a, GlobalMetrics> {
        Box::pin(scripted(self.global, move || {
            GlobalMetrics::new(2.5e12, 9.8e10, 48.0, 17.0, 9_000, -2.0, self.currency)
                .expect("valid global")
        }))
    }

    fn listings<'a>(&'a self, _currency: &'a str, _limit: usize) -> SourceFuture<'a, Vec<MarketItem>> {
        Box::pin(scripted(self.listings, move || {
            vec![MarketItem::new(
                Symbol::crypto("SOL").expect("symbol"),
                "Solana",
                Some(1),
                98.0,
                16.0,
                None,
                None,
                self.currency,
            )
            .expect("valid item")]
        }))
    }
}

/// Opportunity feed that always fails.
struct BrokenFeed {
    provider: Provider,
}

impl DataSource for BrokenFeed {
    fn provider(&self) -> &Provider {
        &self.provider
    }

    fn opportunities<'a>(&'a self, _keyword: Option<&'a str>) -> SourceFuture<'a, Vec<Opportunity>> {
        Box::pin(async { Err(SourceError::rate_limited("quota exhausted")) })
    }
}

struct FailingInsight;

impl InsightProducer for FailingInsight {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn produce<'a>(&'a self, _snapshot: &'a Snapshot) -> InsightFuture<'a> {
        Box::pin(async {
            Err(InsightError::Producer {
                message: String::from("model unavailable"),
            })
        })
    }
}

/// Insight producer that never answers.
struct StalledInsight;

impl InsightProducer for StalledInsight {
    fn name(&self) -> &'static str {
        "stalled"
    }

    fn produce<'a>(&'a self, _snapshot: &'a Snapshot) -> InsightFuture<'a> {
        Box::pin(std::future::pending())
    }
}

fn mocked_config() -> PipelineConfig {
    PipelineConfig::default().with_mock(true)
}

fn symbols(raw: &[&str]) -> Vec<Symbol> {
    raw.iter()
        .map(|value| Symbol::stock(value).expect("valid ticker"))
        .collect()
}

fn business(id: &str, category: &str, price: f64, revenue: f64, profit: f64) -> Opportunity {
    Opportunity::new(
        OpportunityKind::Business,
        OpportunityInput {
            id: id.to_owned(),
            title: format!("{category} listing {id}"),
            category: category.to_owned(),
            price,
            monthly_revenue: revenue,
            monthly_profit: profit,
            age_months: 24,
            listed_score: None,
        },
    )
    .expect("valid opportunity")
}

// =============================================================================
// Chunked fetch: stock quotes
// =============================================================================

#[tokio::test(start_paused = true)]
async fn seven_symbols_in_groups_of_five_with_one_failure() {
    // Given: a quote source that fails for the third symbol and groups of five
    let source = Arc::new(ScriptedQuotes::failing_on("CCC"));
    let config = mocked_config().with_quote_grouping(5, Duration::from_secs(60));
    let pipeline = MarketPulse::builder(config)
        .http_client(Arc::new(NoopHttpClient))
        .stock_source(source.clone())
        .build();
    let started = tokio::time::Instant::now();

    // When: the user asks for seven quotes
    let envelope = pipeline
        .stock_quotes(symbols(&["AAA", "BBB", "CCC", "DDD", "EEE", "FFF", "GGG"]))
        .await
        .expect("partial success is not an error");

    // Then: six quotes succeed and one failure is reported as data
    assert_eq!(envelope.data.quotes.len(), 6);
    assert_eq!(envelope.errors.len(), 1);
    assert!(envelope.errors[0].message.starts_with("CCC"));
    assert_eq!(envelope.errors[0].source, Some(ProviderId::Alphavantage));

    // And: exactly one inter-group delay was applied, with at most five calls in flight
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(60), "one delay expected, got {elapsed:?}");
    assert!(elapsed < Duration::from_secs(120), "only one delay expected, got {elapsed:?}");
    assert!(source.peak_in_flight.load(Ordering::SeqCst) <= 5);
    assert_eq!(source.calls.load(Ordering::SeqCst), 7);

    // And: successes keep input order and nothing is duplicated
    let returned: Vec<&str> = envelope
        .data
        .quotes
        .iter()
        .map(|quote| quote.symbol.as_str())
        .collect();
    assert_eq!(returned, vec!["AAA", "BBB", "DDD", "EEE", "FFF", "GGG"]);
    let unique: HashSet<&str> = returned.iter().copied().collect();
    assert_eq!(unique.len(), returned.len());
}

#[tokio::test(start_paused = true)]
async fn fetcher_reports_groups_delays_and_tagged_failures() {
    // Given: a five-per-minute policy and a fetch that fails for the third parameter
    let policy = ProviderPolicy::from_provider(&Provider::alphavantage(ReliabilityTier::Production));
    let fetcher = ChunkedFetcher::new(policy);
    let params: Vec<u32> = (1..=7).collect();

    // When: all seven parameters are fetched
    let outcome = fetcher
        .fetch_all(params, |param| async move {
            if param == 3 {
                Err(SourceError::unavailable("always fails"))
            } else {
                Ok(param * 10)
            }
        })
        .await;

    // Then: counts add up, failures keep their tag, and one delay separated two groups
    assert_eq!(outcome.success_count() + outcome.failure_count(), 7);
    assert_eq!(outcome.success_count(), 6);
    assert_eq!(outcome.failures()[0].param, 3);
    assert_eq!(outcome.failures()[0].index, 2);
    assert_eq!(outcome.groups_executed(), 2);
    assert_eq!(outcome.delays_applied(), 1);
    assert!(outcome.is_success());
    assert!(outcome
        .successes()
        .iter()
        .all(|success| success.value == success.param * 10));
}

#[tokio::test(start_paused = true)]
async fn slow_unit_times_out_without_cancelling_siblings() {
    // Given: a short per-unit timeout and one parameter that never answers
    let policy = ProviderPolicy::from_provider(&Provider::alphavantage(ReliabilityTier::Production))
        .with_timeout(Duration::from_millis(200));
    let fetcher = ChunkedFetcher::new(policy);

    // When: a single group is fetched
    let outcome = fetcher
        .fetch_all(vec!["fast", "slow", "fast2"], |param| async move {
            if param == "slow" {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok::<_, SourceError>(param.len())
        })
        .await;

    // Then: only the slow unit fails, as a timeout
    assert_eq!(outcome.success_count(), 2);
    assert_eq!(outcome.failure_count(), 1);
    assert_eq!(outcome.failures()[0].error.code(), "source.timeout");
    assert_eq!(outcome.delays_applied(), 0);
}

#[tokio::test(start_paused = true)]
async fn every_symbol_failing_is_an_upstream_failure() {
    // Given: a source that fails for the only requested symbol
    let pipeline = MarketPulse::builder(mocked_config())
        .http_client(Arc::new(NoopHttpClient))
        .stock_source(Arc::new(ScriptedQuotes::failing_on("ZZZ")))
        .build();

    // When: the quote is requested
    let error = pipeline
        .stock_quotes(symbols(&["ZZZ"]))
        .await
        .expect_err("nothing succeeded");

    // Then: the whole call fails with an upstream error naming the provider
    assert_eq!(error.kind(), ErrorKind::UpstreamFailure);
    assert_eq!(error.provider(), Some(ProviderId::Alphavantage));
}

#[tokio::test]
async fn mocked_stock_quotes_feed_the_alert_engine() {
    // Given: the mocked Alpha Vantage tier
    let pipeline = MarketPulse::builder(mocked_config())
        .http_client(Arc::new(NoopHttpClient))
        .build();

    // When: quotes are requested
    let envelope = pipeline
        .stock_quotes(symbols(&["AAPL", "MSFT"]))
        .await
        .expect("mocked quotes");

    // Then: the stock snapshot mirrors the quotes and alerts are derived from it
    let data = envelope.data;
    assert_eq!(data.snapshot.items().len(), 2);
    assert_eq!(data.alerts, AlertEngine::default().evaluate(&data.snapshot));
    assert!(envelope.meta.warnings.is_empty());
}

// =============================================================================
// Aggregation
// =============================================================================

fn live(source: ScriptedMarket) -> MarketAggregator {
    let options = AggregatorOptions::new("USD", 10)
        .expect("options")
        .with_timeout(Duration::from_secs(5));
    MarketAggregator::live(Arc::new(source), options)
}

#[tokio::test]
async fn live_aggregation_merges_both_sub_views_with_provenance() {
    // Given: a healthy live source
    let aggregator = live(ScriptedMarket::new(SubCall::Ok, SubCall::Ok));

    // When: a snapshot is aggregated
    let aggregated = aggregator.snapshot().await.expect("snapshot");

    // Then: both sub-views are present and attributed to the production tier
    let snapshot = aggregated.snapshot;
    assert!(snapshot.global().is_some());
    assert_eq!(snapshot.items().len(), 1);
    assert_eq!(snapshot.provenance().len(), 2);
    assert!(!snapshot.has_mocked_data());
    assert!(aggregated.warnings.is_empty());
}

#[tokio::test]
async fn failed_global_metrics_fails_the_whole_snapshot() {
    // Given: global metrics fail while listings succeed
    let aggregator = live(ScriptedMarket::new(SubCall::Fail, SubCall::Ok));

    // When: a snapshot is aggregated
    let error = aggregator.snapshot().await.expect_err("must fail");

    // Then: one upstream error names the failed sub-call
    assert_eq!(error.kind(), ErrorKind::UpstreamFailure);
    assert!(matches!(
        error,
        PipelineError::UpstreamFailure {
            sub_call: "global_metrics",
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn hanging_listings_time_out_as_upstream_timeout() {
    // Given: listings never answer within the timeout
    let aggregator = live(ScriptedMarket::new(SubCall::Ok, SubCall::Hang));

    // When: a snapshot is aggregated
    let error = aggregator.snapshot().await.expect_err("must time out");

    // Then: the timeout is reported distinctly but still counts as upstream
    assert_eq!(error.kind(), ErrorKind::UpstreamTimeout);
    assert!(error.is_upstream());
    assert!(error.to_string().contains("listings"));
}

#[tokio::test]
async fn foreign_currency_sub_call_fails_fast() {
    // Given: a live source answering in EUR while USD is configured
    let mut source = ScriptedMarket::new(SubCall::Ok, SubCall::Ok);
    source.currency = "EUR";
    let aggregator = live(source);

    // When: a snapshot is aggregated
    let error = aggregator.snapshot().await.expect_err("currency mismatch");

    // Then: a validation failure is returned instead of a mixed snapshot
    assert_eq!(error.kind(), ErrorKind::ValidationFailure);
}

#[tokio::test]
async fn missing_credential_serves_the_reference_snapshot() {
    // Given: no CoinMarketCap credential and no mock flag
    let pipeline = MarketPulse::builder(PipelineConfig::default())
        .http_client(Arc::new(NoopHttpClient))
        .build();

    // When: alerts are requested
    let envelope = pipeline.alerts().await.expect("reference alerts");

    // Then: the reference data drives the alerts and the fallback is reported
    assert_eq!(envelope.meta.warnings.len(), 1);
    assert!(envelope.meta.warnings[0].contains("coinmarketcap"));
    let kinds: Vec<(AlertKind, Priority)> = envelope
        .data
        .iter()
        .map(|alert| (alert.kind, alert.priority))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (AlertKind::Opportunity, Priority::Medium),
            (AlertKind::Warning, Priority::High),
        ]
    );
}

// =============================================================================
// Alerts
// =============================================================================

#[tokio::test]
async fn sixteen_percent_move_raises_one_high_priority_opportunity() {
    // Given: a snapshot whose only item rose 16% and dominance above threshold
    let aggregated = live(ScriptedMarket::new(SubCall::Ok, SubCall::Ok))
        .snapshot()
        .await
        .expect("snapshot");

    // When: alerts are evaluated twice
    let engine = AlertEngine::default();
    let first = engine.evaluate(&aggregated.snapshot);
    let second = engine.evaluate(&aggregated.snapshot);

    // Then: the item alert comes first, followed by the dominance alert (48% < 50%)
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].kind, AlertKind::Opportunity);
    assert_eq!(first[0].priority, Priority::High);
    assert_eq!(first[1].kind, AlertKind::Info);
}

// =============================================================================
// Ranking
// =============================================================================

#[test]
fn category_filter_keeps_only_matching_listing() {
    // Given: one SaaS listing and one e-commerce listing
    let candidates = vec![
        business("a", "saas", 45_000.0, 2_500.0, 1_800.0),
        business("b", "ecommerce", 28_000.0, 3_000.0, 900.0),
    ];
    let filter = OpportunityFilter::new().with_category("SaaS");

    // When: the candidates are ranked
    let ranking = RankingEngine::default().rank(&candidates, &filter);

    // Then: only the SaaS listing remains and stats cover it alone
    assert_eq!(ranking.opportunities.len(), 1);
    assert_eq!(ranking.opportunities[0].opportunity.id(), "a");
    assert_eq!(ranking.total_value, 45_000.0);
    assert_eq!(ranking.average_multiple, 25.0);
}

#[test]
fn filtering_is_idempotent_and_ties_keep_input_order() {
    // Given: identical listings that will score the same
    let candidates: Vec<Opportunity> = ["x", "y", "z"]
        .iter()
        .map(|id| business(id, "content", 10_000.0, 1_000.0, 500.0))
        .collect();
    let filter = OpportunityFilter::new().with_max_price(20_000.0);

    // When: the filter is applied twice and the candidates ranked
    let once = filter.apply(&candidates);
    let twice = filter.apply(&once);
    let ranking = RankingEngine::default().rank(&candidates, &filter);

    // Then: the second pass changes nothing and ties stay in input order
    assert_eq!(once, twice);
    let ids: Vec<&str> = ranking
        .opportunities
        .iter()
        .map(|entry| entry.opportunity.id())
        .collect();
    assert_eq!(ids, vec!["x", "y", "z"]);
}

#[test]
fn empty_ranking_reports_zero_statistics() {
    let candidates = vec![business("a", "saas", 45_000.0, 2_500.0, 1_800.0)];
    let filter = OpportunityFilter::new().with_category("fintech");

    let ranking = RankingEngine::default().rank(&candidates, &filter);

    assert!(ranking.opportunities.is_empty());
    assert_eq!(ranking.matched, 0);
    assert_eq!(ranking.total_value, 0.0);
    assert_eq!(ranking.average_multiple, 0.0);
}

#[tokio::test]
async fn failing_feed_is_reported_while_others_are_ranked() {
    // Given: a healthy Flippa feed and a broken domain feed
    let pipeline = MarketPulse::builder(mocked_config())
        .http_client(Arc::new(NoopHttpClient))
        .opportunity_feeds(vec![
            Arc::new(FlippaAdapter::new()),
            Arc::new(BrokenFeed {
                provider: Provider::godaddy(),
            }),
        ])
        .build();

    // When: opportunities are ranked with a limit
    let envelope = pipeline
        .opportunities(&OpportunityFilter::new(), Some(3))
        .await
        .expect("partial success");

    // Then: the broken feed becomes an envelope error and Flippa listings are ranked
    assert_eq!(envelope.meta.source_chain, vec![ProviderId::Flippa]);
    assert_eq!(envelope.errors.len(), 1);
    assert_eq!(envelope.errors[0].code, "source.rate_limited");
    assert_eq!(envelope.data.opportunities.len(), 3);
    assert!(envelope.data.matched >= 3);
    let scores: Vec<f64> = envelope
        .data
        .opportunities
        .iter()
        .map(|entry| entry.score)
        .collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
    assert!(scores.iter().all(|score| (0.0..=10.0).contains(score)));
}

#[tokio::test]
async fn all_feeds_failing_is_an_upstream_failure() {
    let pipeline = MarketPulse::builder(mocked_config())
        .http_client(Arc::new(NoopHttpClient))
        .opportunity_feeds(vec![Arc::new(BrokenFeed {
            provider: Provider::flippa(),
        })])
        .build();

    let error = pipeline
        .opportunities(&OpportunityFilter::new(), None)
        .await
        .expect_err("no feed succeeded");

    assert!(error.is_upstream());
    assert_eq!(error.provider(), Some(ProviderId::Flippa));
}

// =============================================================================
// Domains and reports
// =============================================================================

#[tokio::test]
async fn invalid_domain_is_an_envelope_error_not_a_failure() {
    let pipeline = MarketPulse::builder(mocked_config())
        .http_client(Arc::new(NoopHttpClient))
        .build();

    let envelope = pipeline
        .domain_availability(vec![String::from("launchpad.io"), String::from("not a domain")])
        .await
        .expect("one domain succeeds");

    assert_eq!(envelope.data.len(), 1);
    assert_eq!(envelope.errors.len(), 1);
    assert_eq!(envelope.errors[0].source, Some(ProviderId::Godaddy));
}

#[tokio::test]
async fn failing_insight_producer_yields_report_without_insight() {
    // Given: an insight producer that always fails
    let pipeline = MarketPulse::builder(mocked_config())
        .http_client(Arc::new(NoopHttpClient))
        .insight_producer(Arc::new(FailingInsight))
        .build();

    // When: the report is built
    let envelope = pipeline.report().await.expect("report still renders");

    // Then: insight is absent and the failure is surfaced as a warning
    assert!(envelope.data.insight.is_none());
    assert!(envelope
        .meta
        .warnings
        .iter()
        .any(|warning| warning.contains("model unavailable")));
    assert_eq!(envelope.data.alerts.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn stalled_insight_producer_is_bounded_by_the_request_timeout() {
    // Given: an insight producer that never finishes and a 500ms request timeout
    let config = mocked_config().with_timeout_ms(500).expect("valid timeout");
    let pipeline = MarketPulse::builder(config)
        .http_client(Arc::new(NoopHttpClient))
        .insight_producer(Arc::new(StalledInsight))
        .build();

    // When: the report is built, with an outer guard far beyond the timeout
    let envelope = tokio::time::timeout(Duration::from_secs(10), pipeline.report())
        .await
        .expect("report must not wait on a stalled producer")
        .expect("report still renders");

    // Then: the report has no insight and the timeout is surfaced as a warning
    assert!(envelope.data.insight.is_none());
    assert!(envelope
        .meta
        .warnings
        .iter()
        .any(|warning| warning.contains("insight unavailable") && warning.contains("500ms")));
}
