mod domains;
mod market;
mod opportunities;
mod report;
mod sources;
mod stocks;

use marketpulse_core::{Envelope, MarketPulse, PipelineConfig};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// What a command hands back to `main` for printing.
pub struct CommandOutcome {
    pub envelope: Envelope<Value>,
    /// Bytes printed verbatim instead of the envelope.
    pub rendered: Option<Vec<u8>>,
}

impl CommandOutcome {
    pub fn envelope<T: Serialize>(envelope: Envelope<T>) -> Result<Self, CliError> {
        let Envelope { meta, data, errors } = envelope;
        Ok(Self {
            envelope: Envelope {
                meta,
                data: serde_json::to_value(data)?,
                errors,
            },
            rendered: None,
        })
    }

    pub fn with_rendered(mut self, rendered: Vec<u8>) -> Self {
        self.rendered = Some(rendered);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandOutcome, CliError> {
    let config = config_for(cli)?;
    debug!(
        currency = %config.currency,
        timeout_ms = config.timeout_ms(),
        mock = config.use_mock,
        "pipeline configured"
    );
    let pipeline = MarketPulse::from_config(config);

    match &cli.command {
        Command::Stocks(args) => stocks::run(args, &pipeline).await,
        Command::Crypto => market::crypto(&pipeline).await,
        Command::Alerts => market::alerts(&pipeline).await,
        Command::Opportunities(args) => opportunities::run(args, &pipeline).await,
        Command::Domains(args) => domains::run(args, &pipeline).await,
        Command::Report(args) => report::run(args, cli.format, &pipeline).await,
        Command::Sources => sources::run(&pipeline),
    }
}

/// Environment configuration with command-line overrides applied on top.
pub fn config_for(cli: &Cli) -> Result<PipelineConfig, CliError> {
    let mut config = PipelineConfig::from_env()?;
    if let Some(currency) = &cli.currency {
        config = config.with_currency(currency)?;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms)?;
    }
    if cli.mock {
        config = config.with_mock(true);
    }
    Ok(config)
}
