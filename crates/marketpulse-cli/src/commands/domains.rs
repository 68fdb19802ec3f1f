use marketpulse_core::MarketPulse;

use crate::cli::DomainsArgs;
use crate::error::CliError;

use super::CommandOutcome;

pub async fn run(args: &DomainsArgs, pipeline: &MarketPulse) -> Result<CommandOutcome, CliError> {
    CommandOutcome::envelope(pipeline.domain_availability(args.domains.clone()).await?)
}
