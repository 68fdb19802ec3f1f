use std::time::Duration;

use crate::{Provider, ProviderId};

/// Scheduling policy the [`ChunkedFetcher`](crate::fetcher::ChunkedFetcher)
/// applies to one provider.
///
/// A batch is split into groups of at most `group_size` concurrent calls,
/// with `group_delay` between consecutive groups. `group_size` never exceeds
/// `quota_limit`, so one group fits inside one quota window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPolicy {
    pub provider_id: ProviderId,
    pub quota_window: Duration,
    pub quota_limit: u32,
    pub group_size: usize,
    pub group_delay: Duration,
    pub request_timeout: Duration,
}

impl ProviderPolicy {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5_000);

    /// Full-quota groups separated by one full window.
    pub fn from_provider(provider: &Provider) -> Self {
        let quota_limit = provider.rate_limit.requests.max(1);
        Self {
            provider_id: provider.id,
            quota_window: provider.rate_limit.window,
            quota_limit,
            group_size: quota_limit as usize,
            group_delay: provider.rate_limit.window,
            request_timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Uses a safe sub-limit below the stated quota, clamped to `1..=quota_limit`.
    pub fn with_group_size(mut self, group_size: usize) -> Self {
        self.group_size = group_size.clamp(1, self.quota_limit as usize);
        self
    }

    pub fn with_group_delay(mut self, group_delay: Duration) -> Self {
        self.group_delay = group_delay;
        self
    }

    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}
