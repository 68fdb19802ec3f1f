//! Filter, score and rank opportunity listings.
//!
//! [`RankingEngine::rank`] applies an [`OpportunityFilter`], scores each
//! match with a pluggable [`Scorer`], sorts by score descending (stable, so
//! ties keep input order) and truncates to the configured limit. Scores are
//! always clamped to `[0.0, 10.0]` and rounded to one decimal, whatever the
//! scorer returns.

use serde::{Deserialize, Serialize};

use crate::{round_half_up, Opportunity, OpportunityKind};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// Declarative opportunity filter. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpportunityFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<OpportunityKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_monthly_revenue: Option<f64>,
    /// Title keywords; a candidate matches when any keyword is a
    /// case-insensitive substring of its title.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl OpportunityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: OpportunityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    pub fn with_min_monthly_revenue(mut self, min_monthly_revenue: f64) -> Self {
        self.min_monthly_revenue = Some(min_monthly_revenue);
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        if !keyword.trim().is_empty() {
            self.keywords.push(keyword);
        }
        self
    }

    pub fn matches(&self, opportunity: &Opportunity) -> bool {
        if self.kind.is_some_and(|kind| kind != opportunity.kind()) {
            return false;
        }

        if let Some(category) = &self.category {
            if category.trim().to_lowercase() != opportunity.category().trim().to_lowercase() {
                return false;
            }
        }

        if self
            .max_price
            .is_some_and(|max_price| opportunity.price() > max_price)
        {
            return false;
        }

        if self
            .min_monthly_revenue
            .is_some_and(|min_revenue| opportunity.monthly_revenue() < min_revenue)
        {
            return false;
        }

        if self.keywords.is_empty() {
            return true;
        }
        let title = opportunity.title().to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| title.contains(&keyword.trim().to_lowercase()))
    }

    /// Matching candidates in input order.
    pub fn apply(&self, candidates: &[Opportunity]) -> Vec<Opportunity> {
        candidates
            .iter()
            .filter(|candidate| self.matches(candidate))
            .cloned()
            .collect()
    }
}

/// Scoring function plugged into the [`RankingEngine`].
pub trait Scorer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Raw score; the engine clamps and rounds it.
    fn score(&self, opportunity: &Opportunity) -> f64;
}

/// Uses the score supplied by the listing feed; unscored listings get zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListedScorer;

impl Scorer for ListedScorer {
    fn name(&self) -> &'static str {
        "listed"
    }

    fn score(&self, opportunity: &Opportunity) -> f64 {
        opportunity.listed_score().unwrap_or(MIN_SCORE)
    }
}

/// Weighted blend of normalized listing fundamentals.
///
/// Each component is normalized into `0.0..=1.0`:
///
/// | Component | Normalization |
/// |-----------|---------------|
/// | margin | `monthly_profit / monthly_revenue` |
/// | multiple | `1 - multiple / multiple_ceiling`, zero when undefined |
/// | age | `age_months / age_ceiling_months` |
/// | revenue | `ln(1 + revenue) / ln(1 + revenue_ceiling)` |
///
/// The weighted mean is scaled to `0.0..=10.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedScorer {
    pub margin_weight: f64,
    pub multiple_weight: f64,
    pub age_weight: f64,
    pub revenue_weight: f64,
    pub multiple_ceiling: f64,
    pub age_ceiling_months: f64,
    pub revenue_ceiling: f64,
}

impl Default for WeightedScorer {
    fn default() -> Self {
        Self {
            margin_weight: 0.35,
            multiple_weight: 0.30,
            age_weight: 0.15,
            revenue_weight: 0.20,
            multiple_ceiling: 60.0,
            age_ceiling_months: 60.0,
            revenue_ceiling: 50_000.0,
        }
    }
}

impl WeightedScorer {
    fn components(&self, opportunity: &Opportunity) -> [(f64, f64); 4] {
        let multiple = opportunity
            .multiple()
            .filter(|_| self.multiple_ceiling > 0.0)
            .map(|multiple| 1.0 - (multiple / self.multiple_ceiling).clamp(0.0, 1.0))
            .unwrap_or(0.0);
        let age = if self.age_ceiling_months > 0.0 {
            (f64::from(opportunity.age_months()) / self.age_ceiling_months).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let revenue = if self.revenue_ceiling > 0.0 {
            (opportunity.monthly_revenue().ln_1p() / self.revenue_ceiling.ln_1p()).clamp(0.0, 1.0)
        } else {
            0.0
        };

        [
            (self.margin_weight, opportunity.margin()),
            (self.multiple_weight, multiple),
            (self.age_weight, age),
            (self.revenue_weight, revenue),
        ]
    }
}

impl Scorer for WeightedScorer {
    fn name(&self) -> &'static str {
        "weighted"
    }

    fn score(&self, opportunity: &Opportunity) -> f64 {
        let components = self.components(opportunity);
        let total_weight: f64 = components
            .iter()
            .map(|(weight, _)| weight.max(0.0))
            .sum();
        if total_weight <= 0.0 {
            return MIN_SCORE;
        }

        let weighted: f64 = components
            .iter()
            .map(|(weight, value)| weight.max(0.0) * value)
            .sum();
        MAX_SCORE * weighted / total_weight
    }
}

/// An opportunity together with its engine-assigned score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredOpportunity {
    #[serde(flatten)]
    pub opportunity: Opportunity,
    pub score: f64,
}

/// Ranked, truncated result with aggregate statistics over the returned set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub opportunities: Vec<ScoredOpportunity>,
    /// Candidates that passed the filter, before truncation.
    pub matched: usize,
    pub total_value: f64,
    pub average_multiple: f64,
    pub scorer: String,
}

pub struct RankingEngine {
    scorer: Box<dyn Scorer>,
    limit: Option<usize>,
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new(Box::new(WeightedScorer::default()))
    }
}

impl std::fmt::Debug for RankingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingEngine")
            .field("scorer", &self.scorer.name())
            .field("limit", &self.limit)
            .finish()
    }
}

impl RankingEngine {
    pub fn new(scorer: Box<dyn Scorer>) -> Self {
        Self {
            scorer,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn rank(&self, candidates: &[Opportunity], filter: &OpportunityFilter) -> Ranking {
        let mut scored: Vec<ScoredOpportunity> = filter
            .apply(candidates)
            .into_iter()
            .map(|opportunity| {
                let raw = self.scorer.score(&opportunity);
                ScoredOpportunity {
                    score: normalize_score(raw),
                    opportunity,
                }
            })
            .collect();
        let matched = scored.len();

        // `sort_by` is stable: equal scores keep their input order.
        scored.sort_by(|left, right| right.score.total_cmp(&left.score));
        if let Some(limit) = self.limit {
            scored.truncate(limit);
        }

        // Exact sum; only the average multiple is rounded.
        let total_value = scored.iter().map(|entry| entry.opportunity.price()).sum();
        let multiples: Vec<f64> = scored
            .iter()
            .filter_map(|entry| entry.opportunity.multiple())
            .collect();
        let average_multiple = if multiples.is_empty() {
            0.0
        } else {
            round_half_up(multiples.iter().sum::<f64>() / multiples.len() as f64, 1)
        };

        Ranking {
            opportunities: scored,
            matched,
            total_value,
            average_multiple,
            scorer: self.scorer.name().to_owned(),
        }
    }
}

fn normalize_score(raw: f64) -> f64 {
    if !raw.is_finite() {
        return MIN_SCORE;
    }
    round_half_up(raw.clamp(MIN_SCORE, MAX_SCORE), 1)
}
