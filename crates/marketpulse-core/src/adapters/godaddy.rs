use crate::data_source::{DataSource, SourceError, SourceFuture};
use crate::{DomainAvailability, Opportunity, OpportunityInput, OpportunityKind, Provider};

use super::flippa::narrow_by_keyword;

pub const DEFAULT_AVAILABILITY_SEED: u64 = 0x6d61_726b_6574;

/// Domain aftermarket listings and registration checks.
///
/// Availability is generated from a seeded RNG keyed by `(seed, domain)`, so
/// the answer for a domain never depends on how many other domains were
/// checked before it or in which order.
#[derive(Debug, Clone)]
pub struct GoDaddyAdapter {
    provider: Provider,
    seed: u64,
}

impl Default for GoDaddyAdapter {
    fn default() -> Self {
        Self::with_seed(DEFAULT_AVAILABILITY_SEED)
    }
}

impl GoDaddyAdapter {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            provider: Provider::godaddy(),
            seed,
        }
    }

    fn check(&self, domain: &str) -> Result<DomainAvailability, SourceError> {
        let domain = normalize_domain(domain)?;
        let mut rng = fastrand::Rng::with_seed(self.seed ^ domain_hash(&domain));

        let available = rng.f64() < 0.6;
        let price = available.then(|| {
            let cents = rng.u32(899..=4_999);
            f64::from(cents) / 100.0
        });

        DomainAvailability::new(domain, available, price, "USD")
            .map_err(|error| SourceError::internal(error.to_string()))
    }
}

impl DataSource for GoDaddyAdapter {
    fn provider(&self) -> &Provider {
        &self.provider
    }

    fn opportunities<'a>(&'a self, keyword: Option<&'a str>) -> SourceFuture<'a, Vec<Opportunity>> {
        Box::pin(async move {
            let catalog = godaddy_catalog()?;
            Ok(narrow_by_keyword(catalog, keyword))
        })
    }

    fn availability<'a>(&'a self, domain: String) -> SourceFuture<'a, DomainAvailability> {
        Box::pin(async move { self.check(&domain) })
    }
}

fn normalize_domain(input: &str) -> Result<String, SourceError> {
    let domain = input.trim().trim_end_matches('.').to_ascii_lowercase();
    let labels: Vec<&str> = domain.split('.').collect();

    let valid = labels.len() >= 2
        && domain.len() <= 253
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
        });

    if !valid {
        return Err(SourceError::invalid_request(format!(
            "'{input}' is not a valid domain name"
        )));
    }
    Ok(domain)
}

// FNV-1a, stable across platforms and releases unlike `DefaultHasher`.
fn domain_hash(domain: &str) -> u64 {
    domain.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |acc, byte| {
        (acc ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

// (id, domain, category, price, monthly revenue, monthly profit, age months, listed score)
const CATALOG: [(&str, &str, &str, f64, f64, f64, u32, f64); 6] = [
    ("godaddy-2001", "aiventures.com", "tech", 8_500.0, 45.0, 40.0, 60, 8.2),
    ("godaddy-2002", "cryptopulse.io", "crypto", 3_200.0, 0.0, 0.0, 30, 7.4),
    ("godaddy-2003", "greenhomes.co", "realestate", 1_800.0, 0.0, 0.0, 24, 7.1),
    ("godaddy-2004", "saasmetrics.com", "tech", 12_000.0, 120.0, 110.0, 96, 8.8),
    ("godaddy-2005", "petwellness.net", "health", 950.0, 0.0, 0.0, 14, 6.3),
    ("godaddy-2006", "fintrack.app", "finance", 2_400.0, 15.0, 12.0, 18, 7.6),
];

fn godaddy_catalog() -> Result<Vec<Opportunity>, SourceError> {
    CATALOG
        .iter()
        .map(
            |&(id, domain, category, price, revenue, profit, age_months, score)| {
                Opportunity::new(
                    OpportunityKind::Domain,
                    OpportunityInput {
                        id: id.to_owned(),
                        title: domain.to_owned(),
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
