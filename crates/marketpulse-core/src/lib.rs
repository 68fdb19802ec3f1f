//! # Marketpulse Core
//!
//! Aggregation, scoring and reporting pipeline over unreliable,
//! rate-limited market data providers.
//!
//! ## Overview
//!
//! This crate provides the pipeline stages behind the `marketpulse` CLI:
//!
//! - **Provider adapters** for stock quotes, crypto listings and opportunity feeds
//! - **Chunked fetcher** that keeps single-item calls under a provider's rate limit
//! - **Aggregator** that merges concurrent sub-calls into one immutable snapshot
//! - **Ranking engine** for filtering and scoring opportunity listings
//! - **Alert engine** deriving threshold signals from a snapshot
//! - **Report renderer** producing JSON or Markdown from one report value
//! - **Response envelope** with metadata, freshness policy and structured errors
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Alpha Vantage, CoinMarketCap, Flippa, GoDaddy) |
//! | [`aggregator`] | Snapshot aggregation and the reference fallback |
//! | [`alerts`] | Threshold alert rules |
//! | [`config`] | Pipeline configuration from the environment |
//! | [`data_source`] | Data source trait and adapter errors |
//! | [`domain`] | Domain models (quotes, listings, opportunities, alerts, insight) |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Pipeline, validation and render errors |
//! | [`fetcher`] | Rate-limited chunked fetching |
//! | [`http_client`] | HTTP client abstraction |
//! | [`insight`] | Insight producer boundary |
//! | [`pipeline`] | Entry points returning envelopes |
//! | [`provider_policy`] | Per-provider quota and timeout policy |
//! | [`ranking`] | Opportunity filtering, scoring and ranking |
//! | [`report`] | Report model and renderers |
//! | [`snapshot`] | Immutable snapshot with provenance |
//! | [`source`] | Provider identifiers and descriptors |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use marketpulse_core::{render, MarketPulse, PipelineConfig, ReportFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = MarketPulse::from_config(PipelineConfig::from_env()?);
//!
//!     let envelope = pipeline.report().await?;
//!     let markdown = render(&envelope.data, ReportFormat::Text)?;
//!     println!("{}", String::from_utf8_lossy(&markdown));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  MarketPulse    │────▶│ Chunked Fetcher  │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Aggregator      │────▶│ Data Source      │
//! │ (Snapshot)      │     │ (Adapter Trait)  │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Alerts/Ranking  │
//! │ Report Renderer │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Entry points return [`PipelineError`], whose [`ErrorKind`] separates
//! missing configuration, upstream failures and timeouts, validation and
//! rendering:
//!
//! ```rust
//! use marketpulse_core::{ErrorKind, PipelineError};
//!
//! fn exit_code(error: &PipelineError) -> i32 {
//!     match error.kind() {
//!         ErrorKind::ValidationFailure => 2,
//!         ErrorKind::UpstreamFailure | ErrorKind::UpstreamTimeout => 3,
//!         _ => 1,
//!     }
//! }
//! ```

pub mod adapters;
pub mod aggregator;
pub mod alerts;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod insight;
pub mod pipeline;
pub mod provider_policy;
pub mod ranking;
pub mod reference;
pub mod report;
pub mod snapshot;
pub mod source;

// Adapter implementations
pub use adapters::{AlphaVantageAdapter, CoinMarketCapAdapter, FlippaAdapter, GoDaddyAdapter};

// Aggregation
pub use aggregator::{AggregatedSnapshot, AggregatorOptions, MarketAggregator, SnapshotFeed};
pub use reference::reference_snapshot;

// Alerts
pub use alerts::{AlertEngine, AlertRules};

// Configuration
pub use config::PipelineConfig;

// Data source trait and types
pub use data_source::{
    Capability, CapabilitySet, DataSource, SourceError, SourceErrorKind, SourceFuture,
};

// Domain models
pub use domain::{
    round_half_up, validate_currency_code, Alert, AlertKind, AssetClass, DomainAvailability,
    GlobalMetrics, Insight, MarketItem, Opportunity, OpportunityInput, OpportunityKind, Priority,
    Sentiment, StockQuote, Symbol, UtcDateTime,
};

// Envelope types
pub use envelope::{CachePolicy, Envelope, EnvelopeError, EnvelopeMeta};

// Error types
pub use error::{ErrorKind, PipelineError, RenderError, ValidationError};

// Fetching
pub use fetcher::{BatchOutcome, ChunkedFetcher, FetchFailure, FetchSuccess};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};

// Insight
pub use insight::{DigestInsightProducer, InsightError, InsightFuture, InsightProducer};

// Entry points
pub use pipeline::{MarketPulse, MarketPulseBuilder, StockQuotes};

// Provider policies
pub use provider_policy::ProviderPolicy;

// Ranking
pub use ranking::{
    ListedScorer, OpportunityFilter, Ranking, RankingEngine, ScoredOpportunity, Scorer,
    WeightedScorer,
};

// Reports
pub use report::{
    format_count, format_money, format_percent, render, Report, ReportFormat, ReportMeta,
};

// Snapshots
pub use snapshot::{Provenance, Snapshot, SnapshotBuilder, SubView};

// Source identifiers
pub use source::{Provider, ProviderId, RateLimit, ReliabilityTier};
