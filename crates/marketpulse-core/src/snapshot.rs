//! Immutable point-in-time market view.
//!
//! A [`Snapshot`] can only be obtained from [`SnapshotBuilder::build`] or by
//! deserializing a structured record, and both paths run the same checks:
//!
//! - at least one sub-view (`global` or `items`) is present;
//! - every present sub-view has a recorded [`Provenance`];
//! - every monetary figure shares the snapshot's currency.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{
    validate_currency_code, GlobalMetrics, MarketItem, Provider, ProviderId, ReliabilityTier,
    UtcDateTime, ValidationError,
};

/// Named part of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubView {
    Global,
    Items,
}

impl SubView {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Items => "items",
        }
    }
}

impl Display for SubView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which provider call produced a sub-view, and from which tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provenance {
    pub provider: ProviderId,
    pub sub_view: SubView,
    pub tier: ReliabilityTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SnapshotRecord {
    generated_at: UtcDateTime,
    currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    global: Option<GlobalMetrics>,
    #[serde(default)]
    items: Vec<MarketItem>,
    provenance: Vec<Provenance>,
}

/// Unified view over one or more provider calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord", into = "SnapshotRecord")]
pub struct Snapshot {
    generated_at: UtcDateTime,
    currency: String,
    global: Option<GlobalMetrics>,
    items: Vec<MarketItem>,
    provenance: Vec<Provenance>,
}

impl Snapshot {
    pub fn builder(currency: impl Into<String>) -> SnapshotBuilder {
        SnapshotBuilder::new(currency)
    }

    pub fn generated_at(&self) -> UtcDateTime {
        self.generated_at
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn global(&self) -> Option<&GlobalMetrics> {
        self.global.as_ref()
    }

    pub fn items(&self) -> &[MarketItem] {
        &self.items
    }

    pub fn provenance(&self) -> &[Provenance] {
        &self.provenance
    }

    /// Sub-views exposed by this snapshot, `global` first.
    pub fn sub_views(&self) -> Vec<SubView> {
        let mut views = Vec::with_capacity(2);
        if self.global.is_some() {
            views.push(SubView::Global);
        }
        if !self.items.is_empty() {
            views.push(SubView::Items);
        }
        views
    }

    /// Contributing providers, deduplicated, in provenance order.
    pub fn data_sources(&self) -> Vec<ProviderId> {
        let mut sources = Vec::with_capacity(self.provenance.len());
        for entry in &self.provenance {
            if !sources.contains(&entry.provider) {
                sources.push(entry.provider);
            }
        }
        sources
    }

    /// True when any sub-view came from a mocked tier.
    pub fn has_mocked_data(&self) -> bool {
        self.provenance
            .iter()
            .any(|entry| entry.tier == ReliabilityTier::Mocked)
    }

    fn validate(record: SnapshotRecord) -> Result<Self, ValidationError> {
        let currency = validate_currency_code(&record.currency)?;
        let snapshot = Self {
            generated_at: record.generated_at,
            currency,
            global: record.global,
            items: record.items,
            provenance: record.provenance,
        };

        let views = snapshot.sub_views();
        if views.is_empty() {
            return Err(ValidationError::EmptySnapshot);
        }

        for view in views {
            let recorded = snapshot
                .provenance
                .iter()
                .any(|entry| entry.sub_view == view);
            if !recorded {
                return Err(ValidationError::MissingProvenance {
                    sub_view: view.as_str(),
                });
            }
        }

        if let Some(global) = &snapshot.global {
            ensure_currency(&snapshot.currency, &global.currency, "global")?;
        }
        for item in &snapshot.items {
            ensure_currency(
                &snapshot.currency,
                &item.currency,
                &format!("items[{}]", item.symbol),
            )?;
        }

        Ok(snapshot)
    }
}

impl TryFrom<SnapshotRecord> for Snapshot {
    type Error = ValidationError;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        Self::validate(record)
    }
}

impl From<Snapshot> for SnapshotRecord {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            generated_at: snapshot.generated_at,
            currency: snapshot.currency,
            global: snapshot.global,
            items: snapshot.items,
            provenance: snapshot.provenance,
        }
    }
}

fn ensure_currency(expected: &str, found: &str, context: &str) -> Result<(), ValidationError> {
    if !expected.eq_ignore_ascii_case(found) {
        return Err(ValidationError::CurrencyMismatch {
            context: context.to_owned(),
            expected: expected.to_owned(),
            found: found.to_owned(),
        });
    }
    Ok(())
}

/// Collects sub-views together with the provider call that produced each.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    currency: String,
    generated_at: Option<UtcDateTime>,
    global: Option<GlobalMetrics>,
    items: Vec<MarketItem>,
    provenance: Vec<Provenance>,
}

impl SnapshotBuilder {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            generated_at: None,
            global: None,
            items: Vec::new(),
            provenance: Vec::new(),
        }
    }

    /// Pins the generation timestamp; defaults to the time of `build()`.
    pub fn generated_at(mut self, generated_at: UtcDateTime) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    pub fn global(mut self, global: GlobalMetrics, provider: &Provider) -> Self {
        self.global = Some(global);
        self.record(provider, SubView::Global);
        self
    }

    pub fn items(mut self, items: Vec<MarketItem>, provider: &Provider) -> Self {
        self.items.extend(items);
        self.record(provider, SubView::Items);
        self
    }

    fn record(&mut self, provider: &Provider, sub_view: SubView) {
        let entry = Provenance {
            provider: provider.id,
            sub_view,
            tier: provider.tier,
        };
        if !self.provenance.contains(&entry) {
            self.provenance.push(entry);
        }
    }

    pub fn build(self) -> Result<Snapshot, ValidationError> {
        Snapshot::validate(SnapshotRecord {
            generated_at: self.generated_at.unwrap_or_else(UtcDateTime::now),
            currency: self.currency,
            global: self.global,
            items: self.items,
            provenance: self.provenance,
        })
    }
}
