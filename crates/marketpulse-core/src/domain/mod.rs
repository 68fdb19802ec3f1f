//! # Domain Models
//!
//! Canonical domain types for marketpulse snapshots, rankings and alerts.
//!
//! ## Overview
//!
//! Every type here validates its invariants at construction, so a value that
//! exists is a value the engines can trust:
//!
//! - **Type-safe**: symbols and currencies are normalized once
//! - **Validated**: negative or non-finite numbers never reach ranking
//! - **Serializable**: full serde support for JSON
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StockQuote`] | Latest stock quote from a quotes provider |
//! | [`MarketItem`] | One listed asset inside a snapshot |
//! | [`GlobalMetrics`] | Market-wide crypto metrics |
//! | [`DomainAvailability`] | Registration status for a domain name |
//! | [`Opportunity`] | Domain or business listing candidate |
//! | [`Alert`] | Threshold signal derived from a snapshot |
//! | [`Insight`] | Narrative summary over a snapshot |
//! | [`Symbol`] | Stock ticker or crypto listing symbol, per [`AssetClass`] |
//! | [`UtcDateTime`] | UTC timestamp |

mod insight;
mod market;
mod numeric;
mod opportunity;
mod signal;
mod symbol;
mod timestamp;

pub use insight::{Insight, Sentiment};
pub use market::{DomainAvailability, GlobalMetrics, MarketItem, StockQuote};
pub use numeric::{round_half_up, validate_currency_code};
pub use opportunity::{Opportunity, OpportunityInput, OpportunityKind};
pub use signal::{Alert, AlertKind, Priority};
pub use symbol::{AssetClass, Symbol};
pub use timestamp::UtcDateTime;
