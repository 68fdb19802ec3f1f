use marketpulse_core::{MarketPulse, Provider, ProviderId};
use serde::Serialize;

use crate::error::CliError;

use super::CommandOutcome;

#[derive(Debug, Serialize)]
struct SourceStatus {
    id: ProviderId,
    name: &'static str,
    tier: &'static str,
    auth_required: bool,
    requests_per_window: u32,
    window_secs: u64,
    capabilities: Vec<&'static str>,
}

impl From<&Provider> for SourceStatus {
    fn from(provider: &Provider) -> Self {
        Self {
            id: provider.id,
            name: provider.name,
            tier: provider.tier.as_str(),
            auth_required: provider.auth_required,
            requests_per_window: provider.rate_limit.requests,
            window_secs: provider.rate_limit.window.as_secs(),
            capabilities: provider.capabilities.supported(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SourcesResponseData {
    sources: Vec<SourceStatus>,
}

pub fn run(pipeline: &MarketPulse) -> Result<CommandOutcome, CliError> {
    let envelope = pipeline.sources()?.map(|providers| SourcesResponseData {
        sources: providers.iter().map(SourceStatus::from).collect(),
    });
    CommandOutcome::envelope(envelope)
}
