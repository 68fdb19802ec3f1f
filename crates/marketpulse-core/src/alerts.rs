//! Threshold alerts over a [`Snapshot`].
//!
//! | Rule | Condition | Kind | Priority |
//! |------|-----------|------|----------|
//! | item move | `abs(change_24h) > item_move_threshold` | opportunity (up) / warning (down) | high above `high_priority_threshold`, else medium |
//! | dominance | `btc_dominance < dominance_threshold` | info | medium |
//!
//! Item rules run first in item order, then global rules.

use serde::{Deserialize, Serialize};

use crate::report::{format_money, format_percent};
use crate::{Alert, AlertKind, MarketItem, Priority, Snapshot};

/// Alert thresholds, all in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertRules {
    pub item_move_threshold: f64,
    pub high_priority_threshold: f64,
    pub dominance_threshold: f64,
}

impl Default for AlertRules {
    fn default() -> Self {
        Self {
            item_move_threshold: 10.0,
            high_priority_threshold: 15.0,
            dominance_threshold: 50.0,
        }
    }
}

/// Pure rule evaluator; the same snapshot always yields the same alerts.
#[derive(Debug, Clone, Default)]
pub struct AlertEngine {
    rules: AlertRules,
}

impl AlertEngine {
    pub fn new(rules: AlertRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &AlertRules {
        &self.rules
    }

    pub fn evaluate(&self, snapshot: &Snapshot) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = snapshot
            .items()
            .iter()
            .filter_map(|item| self.item_move(item))
            .collect();

        if let Some(global) = snapshot.global() {
            if global.btc_dominance < self.rules.dominance_threshold {
                alerts.push(Alert {
                    kind: AlertKind::Info,
                    title: format!(
                        "BTC dominance below {:.0}%",
                        self.rules.dominance_threshold
                    ),
                    message: format!(
                        "Bitcoin dominance is {:.2}%, capital may be rotating into altcoins",
                        global.btc_dominance
                    ),
                    priority: Priority::Medium,
                    symbol: None,
                });
            }
        }

        alerts
    }

    fn item_move(&self, item: &MarketItem) -> Option<Alert> {
        let magnitude = item.change_24h.abs();
        if magnitude <= self.rules.item_move_threshold {
            return None;
        }

        let rising = item.change_24h > 0.0;
        let (kind, direction) = if rising {
            (AlertKind::Opportunity, "surging")
        } else {
            (AlertKind::Warning, "dropping")
        };
        let priority = if magnitude > self.rules.high_priority_threshold {
            Priority::High
        } else {
            Priority::Medium
        };

        Some(Alert {
            kind,
            title: format!("{} {direction} {}", item.symbol, format_percent(item.change_24h)),
            message: format!(
                "{} moved {} in 24h, now {}",
                item.name,
                format_percent(item.change_24h),
                format_money(item.price, &item.currency)
            ),
            priority,
            symbol: Some(item.symbol.clone()),
        })
    }
}
