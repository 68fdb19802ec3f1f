//! Insight producer boundary.
//!
//! The pipeline treats narrative generation as an opaque `Snapshot -> Insight`
//! function. [`DigestInsightProducer`] is the built-in deterministic
//! implementation; model-backed producers plug in through [`InsightProducer`].

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::report::{format_money, format_percent};
use crate::{Insight, MarketItem, Sentiment, Snapshot, ValidationError};

pub type InsightFuture<'a> = Pin<Box<dyn Future<Output = Result<Insight, InsightError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("insight producer failed: {message}")]
    Producer { message: String },

    #[error("insight producer returned an invalid insight: {0}")]
    Invalid(#[from] ValidationError),

    #[error("insight producer timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },
}

pub trait InsightProducer: Send + Sync {
    fn name(&self) -> &'static str;

    fn produce<'a>(&'a self, snapshot: &'a Snapshot) -> InsightFuture<'a>;
}

/// Derives sentiment and talking points directly from snapshot figures.
#[derive(Debug, Clone, Copy)]
pub struct DigestInsightProducer {
    /// Market-wide move, in percent, beyond which sentiment leaves neutral.
    pub sentiment_band: f64,
    /// Per-item move, in percent, that counts as a risk or an opportunity.
    pub notable_move: f64,
}

impl Default for DigestInsightProducer {
    fn default() -> Self {
        Self {
            sentiment_band: 1.0,
            notable_move: 10.0,
        }
    }
}

impl DigestInsightProducer {
    pub fn digest(&self, snapshot: &Snapshot) -> Result<Insight, ValidationError> {
        let currency = snapshot.currency();
        let items = snapshot.items();
        let market_move = match snapshot.global() {
            Some(global) => global.market_cap_change_24h,
            None if items.is_empty() => 0.0,
            None => items.iter().map(|item| item.change_24h).sum::<f64>() / items.len() as f64,
        };

        let sentiment = if market_move > self.sentiment_band {
            Sentiment::Bullish
        } else if market_move < -self.sentiment_band {
            Sentiment::Bearish
        } else {
            Sentiment::Neutral
        };

        let mut key_points = Vec::new();
        if let Some(global) = snapshot.global() {
            key_points.push(format!(
                "Total market cap {} ({} in 24h)",
                format_money(global.total_market_cap, currency),
                format_percent(global.market_cap_change_24h)
            ));
            key_points.push(format!("BTC dominance {:.2}%", global.btc_dominance));
        }
        if let Some(top) = extreme(items, |a, b| a.change_24h.total_cmp(&b.change_24h)) {
            key_points.push(format!(
                "Top gainer {} {}",
                top.symbol,
                format_percent(top.change_24h)
            ));
        }
        if let Some(bottom) = extreme(items, |a, b| b.change_24h.total_cmp(&a.change_24h)) {
            key_points.push(format!(
                "Top loser {} {}",
                bottom.symbol,
                format_percent(bottom.change_24h)
            ));
        }

        let risks = items
            .iter()
            .filter(|item| item.change_24h < -self.notable_move)
            .map(|item| format!("{} fell {}", item.name, format_percent(item.change_24h)))
            .collect();
        let opportunities = items
            .iter()
            .filter(|item| item.change_24h > self.notable_move)
            .map(|item| format!("{} gained {}", item.name, format_percent(item.change_24h)))
            .collect();

        let mut confidence: u8 = 50;
        if snapshot.global().is_some() {
            confidence += 20;
        }
        if items.len() >= 5 {
            confidence += 15;
        }
        if snapshot.has_mocked_data() {
            confidence -= 25;
        }

        let summary = format!(
            "Market is {} with a {} move over 24h across {} tracked assets.",
            sentiment.as_str(),
            format_percent(market_move),
            items.len()
        );

        Insight::new(summary, sentiment, key_points, risks, opportunities, confidence)
    }
}

fn extreme<'a, F>(items: &'a [MarketItem], compare: F) -> Option<&'a MarketItem>
where
    F: Fn(&MarketItem, &MarketItem) -> std::cmp::Ordering,
{
    items.iter().max_by(|a, b| compare(*a, *b))
}

impl InsightProducer for DigestInsightProducer {
    fn name(&self) -> &'static str {
        "digest"
    }

    fn produce<'a>(&'a self, snapshot: &'a Snapshot) -> InsightFuture<'a> {
        Box::pin(async move { self.digest(snapshot).map_err(InsightError::from) })
    }
}
