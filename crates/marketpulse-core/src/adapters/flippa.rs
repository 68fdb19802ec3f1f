use crate::data_source::{DataSource, SourceError, SourceFuture};
use crate::{Opportunity, OpportunityInput, OpportunityKind, Provider};

/// Business-for-sale listings from a deterministic Flippa catalog.
#[derive(Debug, Clone)]
pub struct FlippaAdapter {
    provider: Provider,
}

impl Default for FlippaAdapter {
    fn default() -> Self {
        Self {
            provider: Provider::flippa(),
        }
    }
}

impl FlippaAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataSource for FlippaAdapter {
    fn provider(&self) -> &Provider {
        &self.provider
    }

    fn opportunities<'a>(&'a self, keyword: Option<&'a str>) -> SourceFuture<'a, Vec<Opportunity>> {
        Box::pin(async move {
            let catalog = flippa_catalog()?;
            Ok(narrow_by_keyword(catalog, keyword))
        })
    }
}

// (id, title, category, price, monthly revenue, monthly profit, age months, listed score)
const CATALOG: [(&str, &str, &str, f64, f64, f64, u32, f64); 8] = [
    ("flippa-1001", "Niche SaaS for dental clinics", "saas", 45_000.0, 2_500.0, 1_800.0, 26, 8.7),
    ("flippa-1002", "Eco home goods store", "ecommerce", 28_000.0, 3_100.0, 900.0, 18, 7.1),
    ("flippa-1003", "Personal finance blog", "content", 12_500.0, 650.0, 600.0, 40, 7.8),
    ("flippa-1004", "Pet supplies dropshipping store", "ecommerce", 9_800.0, 2_200.0, 400.0, 11, 6.2),
    ("flippa-1005", "Invoice automation SaaS", "saas", 120_000.0, 6_800.0, 4_100.0, 34, 9.1),
    ("flippa-1006", "Recipe video channel", "content", 7_400.0, 380.0, 350.0, 22, 6.9),
    ("flippa-1007", "Crypto research newsletter", "newsletter", 18_000.0, 1_200.0, 950.0, 15, 7.5),
    ("flippa-1008", "Mobile habit tracker app", "app", 22_000.0, 1_400.0, 700.0, 19, 7.0),
];

fn flippa_catalog() -> Result<Vec<Opportunity>, SourceError> {
    CATALOG
        .iter()
        .map(
            |&(id, title, category, price, revenue, profit, age_months, score)| {
                Opportunity::new(
                    OpportunityKind::Business,
                    OpportunityInput {
                        id: id.to_owned(),
                        title: title.to_owned(),
                        category: category.to_owned(),
                        price,
                        monthly_revenue: revenue,
                        monthly_profit: profit,
                        age_months,
                        listed_score: Some(score),
                    },
                )
                .map_err(|error| SourceError::internal(error.to_string()))
            },
        )
        .collect()
}

/// Upstream-style keyword narrowing on the title. The ranking filter applies
/// its own keyword match on top of this.
pub(crate) fn narrow_by_keyword(catalog: Vec<Opportunity>, keyword: Option<&str>) -> Vec<Opportunity> {
    let Some(keyword) = keyword.map(str::trim).filter(|keyword| !keyword.is_empty()) else {
        return catalog;
    };
    let needle = keyword.to_lowercase();
    catalog
        .into_iter()
        .filter(|opportunity| opportunity.title().to_lowercase().contains(&needle))
        .collect()
}
