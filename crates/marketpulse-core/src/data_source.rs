//! Provider adapter contract and adapter-level errors.
//!
//! Every upstream integration implements [`DataSource`]. Adapters perform a
//! single network call (or produce deterministic data in the mocked tier) and
//! reshape the response into domain types. They never retry, back off, or
//! rate-limit: the [`ChunkedFetcher`](crate::fetcher::ChunkedFetcher) and the
//! [`MarketAggregator`](crate::aggregator::MarketAggregator) own those concerns.
//!
//! | Method | Capability | Output |
//! |--------|------------|--------|
//! | [`quote`](DataSource::quote) | quotes | [`StockQuote`] |
//! | [`global_metrics`](DataSource::global_metrics) | global metrics | [`GlobalMetrics`] |
//! | [`listings`](DataSource::listings) | listings | `Vec<MarketItem>` |
//! | [`opportunities`](DataSource::opportunities) | listings | `Vec<Opportunity>` |
//! | [`availability`](DataSource::availability) | availability | [`DomainAvailability`] |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{DomainAvailability, GlobalMetrics, MarketItem, Opportunity, Provider, StockQuote, Symbol};

/// Boxed future returned by adapter calls.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Data capability used for capability checks and the `sources` listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Quotes,
    Listings,
    GlobalMetrics,
    Availability,
}

impl Capability {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quotes => "quotes",
            Self::Listings => "listings",
            Self::GlobalMetrics => "global_metrics",
            Self::Availability => "availability",
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported capability matrix for a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub quotes: bool,
    pub listings: bool,
    pub global_metrics: bool,
    pub availability: bool,
}

impl CapabilitySet {
    pub const fn new(quotes: bool, listings: bool, global_metrics: bool, availability: bool) -> Self {
        Self {
            quotes,
            listings,
            global_metrics,
            availability,
        }
    }

    pub const fn only(capability: Capability) -> Self {
        match capability {
            Capability::Quotes => Self::new(true, false, false, false),
            Capability::Listings => Self::new(false, true, false, false),
            Capability::GlobalMetrics => Self::new(false, false, true, false),
            Capability::Availability => Self::new(false, false, false, true),
        }
    }

    pub const fn supports(self, capability: Capability) -> bool {
        match capability {
            Capability::Quotes => self.quotes,
            Capability::Listings => self.listings,
            Capability::GlobalMetrics => self.global_metrics,
            Capability::Availability => self.availability,
        }
    }

    pub fn supported(self) -> Vec<&'static str> {
        [
            Capability::Quotes,
            Capability::Listings,
            Capability::GlobalMetrics,
            Capability::Availability,
        ]
        .into_iter()
        .filter(|capability| self.supports(*capability))
        .map(Capability::as_str)
        .collect()
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    UnsupportedCapability,
    Unavailable,
    RateLimited,
    InvalidRequest,
    Timeout,
    Internal,
}

/// Structured adapter failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unsupported_capability(capability: Capability) -> Self {
        Self {
            kind: SourceErrorKind::UnsupportedCapability,
            message: format!("capability '{capability}' is not supported by this source"),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::UnsupportedCapability => "source.unsupported_capability",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Timeout => "source.timeout",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Source adapter contract.
///
/// Only [`provider`](DataSource::provider) is required; each data method
/// defaults to an `unsupported_capability` error so adapters implement just
/// what their [`CapabilitySet`] advertises.
///
/// Implementations must be `Send + Sync` so they can be shared behind `Arc`.
pub trait DataSource: Send + Sync {
    /// Returns the immutable provider descriptor, including its reliability tier.
    fn provider(&self) -> &Provider;

    /// Fetches a single stock quote.
    fn quote<'a>(&'a self, symbol: Symbol) -> SourceFuture<'a, StockQuote> {
        let _ = symbol;
        unsupported(Capability::Quotes)
    }

    /// Fetches market-wide metrics denominated in `currency`.
    fn global_metrics<'a>(&'a self, currency: &'a str) -> SourceFuture<'a, GlobalMetrics> {
        let _ = currency;
        unsupported(Capability::GlobalMetrics)
    }

    /// Fetches the top `limit` listings denominated in `currency`.
    fn listings<'a>(&'a self, currency: &'a str, limit: usize) -> SourceFuture<'a, Vec<MarketItem>> {
        let _ = (currency, limit);
        unsupported(Capability::Listings)
    }

    /// Fetches opportunity listings, optionally narrowed upstream by keyword.
    fn opportunities<'a>(&'a self, keyword: Option<&'a str>) -> SourceFuture<'a, Vec<Opportunity>> {
        let _ = keyword;
        unsupported(Capability::Listings)
    }

    /// Checks whether a domain name can be registered.
    fn availability<'a>(&'a self, domain: String) -> SourceFuture<'a, DomainAvailability> {
        let _ = domain;
        unsupported(Capability::Availability)
    }
}

fn unsupported<'a, T: 'a>(capability: Capability) -> SourceFuture<'a, T> {
    Box::pin(async move { Err(SourceError::unsupported_capability(capability)) })
}
