//! Commands served from the aggregated crypto snapshot.

use marketpulse_core::MarketPulse;

use crate::error::CliError;

use super::CommandOutcome;

pub async fn crypto(pipeline: &MarketPulse) -> Result<CommandOutcome, CliError> {
    CommandOutcome::envelope(pipeline.crypto_snapshot().await?)
}

pub async fn alerts(pipeline: &MarketPulse) -> Result<CommandOutcome, CliError> {
    CommandOutcome::envelope(pipeline.alerts().await?)
}
