use marketpulse_core::{MarketPulse, OpportunityFilter};

use crate::cli::OpportunitiesArgs;
use crate::error::CliError;

use super::CommandOutcome;

pub async fn run(
    args: &OpportunitiesArgs,
    pipeline: &MarketPulse,
) -> Result<CommandOutcome, CliError> {
    CommandOutcome::envelope(pipeline.opportunities(&filter_for(args), args.limit).await?)
}

fn filter_for(args: &OpportunitiesArgs) -> OpportunityFilter {
    let mut filter = OpportunityFilter::new();
    if let Some(kind) = args.kind {
        filter = filter.with_kind(kind.into());
    }
    if let Some(category) = &args.category {
        filter = filter.with_category(category.clone());
    }
    if let Some(max_price) = args.max_price {
        filter = filter.with_max_price(max_price);
    }
    if let Some(min_revenue) = args.min_revenue {
        filter = filter.with_min_monthly_revenue(min_revenue);
    }
    for keyword in &args.keywords {
        filter = filter.with_keyword(keyword.clone());
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::KindArg;
    use marketpulse_core::OpportunityKind;

    #[test]
    fn maps_every_flag_onto_the_filter() {
        let args = OpportunitiesArgs {
            kind: Some(KindArg::Business),
            category: Some(String::from("SaaS")),
            max_price: Some(50_000.0),
            min_revenue: Some(1_000.0),
            keywords: vec![String::from("analytics")],
            limit: Some(3),
        };

        let filter = filter_for(&args);

        assert_eq!(filter.kind, Some(OpportunityKind::Business));
        assert_eq!(filter.max_price, Some(50_000.0));
        assert_eq!(filter.min_monthly_revenue, Some(1_000.0));
        assert_eq!(filter.keywords.len(), 1);
    }
}
