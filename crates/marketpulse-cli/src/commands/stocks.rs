use marketpulse_core::{MarketPulse, Symbol};

use crate::cli::StocksArgs;
use crate::error::CliError;

use super::CommandOutcome;

pub async fn run(args: &StocksArgs, pipeline: &MarketPulse) -> Result<CommandOutcome, CliError> {
    let symbols = args
        .symbols
        .iter()
        .map(|raw| Symbol::stock(raw))
        .collect::<Result<Vec<_>, _>>()?;

    CommandOutcome::envelope(pipeline.stock_quotes(symbols).await?)
}
