//! Rate-limited, partial-failure-tolerant batch fetching.
//!
//! Quota-constrained providers (Alpha Vantage allows 5 calls per minute on
//! the free tier) answer one parameter per call. [`ChunkedFetcher`] drives
//! many such calls by splitting the input into consecutive groups no larger
//! than the policy's group size, running each group concurrently, and
//! sleeping a fixed delay between groups. A failing unit never aborts its
//! siblings: failures are collected and returned next to the successes.

use std::fmt::Debug;
use std::future::Future;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::data_source::SourceError;
use crate::provider_policy::ProviderPolicy;

/// A successful unit, tagged with its input position and parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSuccess<P, T> {
    pub index: usize,
    pub param: P,
    pub value: T,
}

/// A failed unit, tagged with its input position and parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure<P> {
    pub index: usize,
    pub param: P,
    pub error: SourceError,
}

/// Result of one [`ChunkedFetcher::fetch_all`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<P, T> {
    successes: Vec<FetchSuccess<P, T>>,
    failures: Vec<FetchFailure<P>>,
    groups_executed: usize,
    delays_applied: usize,
}

impl<P, T> BatchOutcome<P, T> {
    /// Successful units in input order.
    pub fn successes(&self) -> &[FetchSuccess<P, T>] {
        &self.successes
    }

    /// Failed units in input order.
    pub fn failures(&self) -> &[FetchFailure<P>] {
        &self.failures
    }

    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub const fn groups_executed(&self) -> usize {
        self.groups_executed
    }

    pub const fn delays_applied(&self) -> usize {
        self.delays_applied
    }

    /// True when at least one unit succeeded. An empty batch is a success.
    pub fn is_success(&self) -> bool {
        !self.successes.is_empty() || self.failures.is_empty()
    }

    /// True when no unit failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_parts(self) -> (Vec<FetchSuccess<P, T>>, Vec<FetchFailure<P>>) {
        (self.successes, self.failures)
    }
}

/// Drives single-item adapter calls under a provider's rate limit.
#[derive(Debug, Clone)]
pub struct ChunkedFetcher {
    policy: ProviderPolicy,
}

impl ChunkedFetcher {
    pub fn new(policy: ProviderPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ProviderPolicy {
        &self.policy
    }

    /// Fetches every parameter with `fetch`, at most `group_size` at a time.
    ///
    /// Each unit is bounded by the policy timeout; an elapsed timeout is a
    /// unit failure of kind `timeout`. No delay follows the last group.
    pub async fn fetch_all<P, T, F, Fut>(&self, params: Vec<P>, fetch: F) -> BatchOutcome<P, T>
    where
        P: Clone + Debug,
        F: Fn(P) -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let group_size = self.policy.group_size.max(1);
        let timeout = self.policy.request_timeout;
        let provider = self.policy.provider_id;
        let tagged: Vec<(usize, P)> = params.into_iter().enumerate().collect();
        let group_count = tagged.len().div_ceil(group_size);

        let mut successes = Vec::with_capacity(tagged.len());
        let mut failures = Vec::new();
        let mut delays_applied = 0;

        for (group_index, group) in tagged.chunks(group_size).enumerate() {
            debug!(
                provider = %provider,
                group = group_index + 1,
                of = group_count,
                size = group.len(),
                "dispatching fetch group"
            );

            let units = group.iter().cloned().map(|(index, param)| {
                let call = fetch(param.clone());
                async move {
                    let result = match tokio::time::timeout(timeout, call).await {
                        Ok(result) => result,
                        Err(_) => Err(SourceError::timeout(format!(
                            "{provider} call exceeded {}ms",
                            timeout.as_millis()
                        ))),
                    };
                    (index, param, result)
                }
            });

            for (index, param, result) in join_all(units).await {
                match result {
                    Ok(value) => successes.push(FetchSuccess { index, param, value }),
                    Err(error) => {
                        warn!(
                            provider = %provider,
                            index,
                            param = ?param,
                            code = error.code(),
                            "fetch unit failed: {}",
                            error.message()
                        );
                        failures.push(FetchFailure { index, param, error });
                    }
                }
            }

            if group_index + 1 < group_count {
                tokio::time::sleep(self.policy.group_delay).await;
                delays_applied += 1;
            }
        }

        successes.sort_by_key(|success| success.index);
        failures.sort_by_key(|failure| failure.index);

        BatchOutcome {
            successes,
            failures,
            groups_executed: group_count,
            delays_applied,
        }
    }
}
