use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::numeric::{validate_non_negative, validate_not_blank};
use crate::ValidationError;

/// Kind of acquirable asset behind an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    Domain,
    Business,
}

impl OpportunityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Business => "business",
        }
    }
}

impl Display for OpportunityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpportunityKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "domain" => Ok(Self::Domain),
            "business" => Ok(Self::Business),
            other => Err(ValidationError::InvalidOpportunityKind {
                value: other.to_owned(),
            }),
        }
    }
}

/// Raw fields of an opportunity listing before validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpportunityInput {
    pub id: String,
    pub title: String,
    pub category: String,
    pub price: f64,
    pub monthly_revenue: f64,
    pub monthly_profit: f64,
    pub age_months: u32,
    pub listed_score: Option<f64>,
}

/// A scoreable, filterable candidate listing (domain name or business).
///
/// Fields are private so every instance, including deserialized ones, has
/// gone through [`Opportunity::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OpportunityRecord", into = "OpportunityRecord")]
pub struct Opportunity {
    id: String,
    kind: OpportunityKind,
    title: String,
    category: String,
    price: f64,
    monthly_revenue: f64,
    monthly_profit: f64,
    age_months: u32,
    listed_score: Option<f64>,
    multiple: Option<f64>,
}

/// Wire form of [`Opportunity`]. `multiple` is written for readers but
/// recomputed on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpportunityRecord {
    id: String,
    kind: OpportunityKind,
    title: String,
    category: String,
    price: f64,
    monthly_revenue: f64,
    monthly_profit: f64,
    age_months: u32,
    /// Score supplied by the listing feed, if any. Never trusted as-is by ranking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    listed_score: Option<f64>,
    /// `price / monthly_profit` when profit is positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    multiple: Option<f64>,
}

impl Opportunity {
    pub fn new(kind: OpportunityKind, input: OpportunityInput) -> Result<Self, ValidationError> {
        validate_not_blank("id", &input.id)?;
        validate_not_blank("title", &input.title)?;
        validate_not_blank("category", &input.category)?;
        validate_non_negative("price", input.price)?;
        validate_non_negative("monthly_revenue", input.monthly_revenue)?;
        // Profit may be negative for loss-making listings, but must be a real number.
        super::numeric::validate_finite("monthly_profit", input.monthly_profit)?;
        if let Some(score) = input.listed_score {
            super::numeric::validate_finite("listed_score", score)?;
        }

        let multiple = (input.monthly_profit > 0.0).then(|| input.price / input.monthly_profit);

        Ok(Self {
            id: input.id,
            kind,
            title: input.title,
            category: input.category.trim().to_lowercase(),
            price: input.price,
            monthly_revenue: input.monthly_revenue,
            monthly_profit: input.monthly_profit,
            age_months: input.age_months,
            listed_score: input.listed_score,
            multiple,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub const fn kind(&self) -> OpportunityKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Lowercased category.
    pub fn category(&self) -> &str {
        &self.category
    }

    pub const fn price(&self) -> f64 {
        self.price
    }

    pub const fn monthly_revenue(&self) -> f64 {
        self.monthly_revenue
    }

    pub const fn monthly_profit(&self) -> f64 {
        self.monthly_profit
    }

    pub const fn age_months(&self) -> u32 {
        self.age_months
    }

    pub const fn listed_score(&self) -> Option<f64> {
        self.listed_score
    }

    /// `price / monthly_profit`; `None` unless profit is positive.
    pub const fn multiple(&self) -> Option<f64> {
        self.multiple
    }

    /// Profit as a share of revenue in `0.0..=1.0`; zero when there is no revenue.
    pub fn margin(&self) -> f64 {
        if self.monthly_revenue <= 0.0 {
            return 0.0;
        }
        (self.monthly_profit / self.monthly_revenue).clamp(0.0, 1.0)
    }
}

impl TryFrom<OpportunityRecord> for Opportunity {
    type Error = ValidationError;

    fn try_from(record: OpportunityRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.kind,
            OpportunityInput {
                id: record.id,
                title: record.title,
                category: record.category,
                price: record.price,
                monthly_revenue: record.monthly_revenue,
                monthly_profit: record.monthly_profit,
                age_months: record.age_months,
                listed_score: record.listed_score,
            },
        )
    }
}

impl From<Opportunity> for OpportunityRecord {
    fn from(opportunity: Opportunity) -> Self {
        Self {
            id: opportunity.id,
            kind: opportunity.kind,
            title: opportunity.title,
            category: opportunity.category,
            price: opportunity.price,
            monthly_revenue: opportunity.monthly_revenue,
            monthly_profit: opportunity.monthly_profit,
            age_months: opportunity.age_months,
            listed_score: opportunity.listed_score,
            multiple: opportunity.multiple,
        }
    }
}
