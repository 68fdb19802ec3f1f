use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data_source::{SourceError, SourceErrorKind};
use crate::envelope::EnvelopeError;
use crate::ProviderId;

/// Validation and contract errors exposed by `marketpulse-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol cannot start with '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },
    #[error("share class separator at index {index} must sit between two alphanumerics")]
    SymbolMisplacedSeparator { index: usize },

    #[error("invalid source '{value}', expected one of alphavantage, coinmarketcap, flippa, godaddy")]
    InvalidSource { value: String },
    #[error("invalid report format '{value}', expected one of json, structured, markdown, text")]
    InvalidFormat { value: String },
    #[error("invalid opportunity kind '{value}', expected domain or business")]
    InvalidOpportunityKind { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("currency must be a 3-letter uppercase ISO code: '{value}'")]
    InvalidCurrency { value: String },
    #[error("currency mismatch in {context}: expected {expected}, found {found}")]
    CurrencyMismatch {
        context: String,
        expected: String,
        found: String,
    },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("field '{field}' cannot be empty")]
    EmptyField { field: &'static str },
    #[error("confidence {value} is outside 0..=100")]
    ConfidenceOutOfRange { value: u8 },

    #[error("snapshot must expose at least one sub-view")]
    EmptySnapshot,
    #[error("snapshot sub-view '{sub_view}' has no recorded provenance")]
    MissingProvenance { sub_view: &'static str },

    #[error("configuration value {name}='{value}' is invalid: {reason}")]
    InvalidConfig {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("source_chain must contain at least one source")]
    EmptySourceChain,

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Machine-readable failure category returned by every pipeline entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigurationMissing,
    UpstreamFailure,
    UpstreamTimeout,
    ValidationFailure,
    RenderFailure,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigurationMissing => "configuration_missing",
            Self::UpstreamFailure => "upstream_failure",
            Self::UpstreamTimeout => "upstream_timeout",
            Self::ValidationFailure => "validation_failure",
            Self::RenderFailure => "render_failure",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure raised while projecting a report into one of its renderings.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("report field '{field}' is required for rendering")]
    MissingField { field: &'static str },

    #[error("structured report is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Top-level error type for pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration missing: {what}")]
    ConfigurationMissing { what: String },

    #[error("upstream sub-call '{sub_call}' on {provider} failed: {source}")]
    UpstreamFailure {
        provider: ProviderId,
        sub_call: &'static str,
        #[source]
        source: SourceError,
    },

    #[error("upstream sub-call '{sub_call}' on {provider} timed out after {timeout_ms}ms")]
    UpstreamTimeout {
        provider: ProviderId,
        sub_call: &'static str,
        timeout_ms: u64,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PipelineError {
    /// Maps an adapter failure onto the pipeline taxonomy, keeping timeouts distinct.
    pub fn upstream(
        provider: ProviderId,
        sub_call: &'static str,
        source: SourceError,
        timeout_ms: u64,
    ) -> Self {
        if source.kind() == SourceErrorKind::Timeout {
            return Self::UpstreamTimeout {
                provider,
                sub_call,
                timeout_ms,
            };
        }
        Self::UpstreamFailure {
            provider,
            sub_call,
            source,
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationMissing { .. } => ErrorKind::ConfigurationMissing,
            Self::UpstreamFailure { .. } => ErrorKind::UpstreamFailure,
            Self::UpstreamTimeout { .. } => ErrorKind::UpstreamTimeout,
            Self::Validation(_) => ErrorKind::ValidationFailure,
            Self::Render(_) => ErrorKind::RenderFailure,
        }
    }

    /// Timeouts are a subtype of upstream failures at every call site.
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamFailure { .. } | Self::UpstreamTimeout { .. }
        )
    }

    pub const fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::ConfigurationMissing => "pipeline.configuration_missing",
            ErrorKind::UpstreamFailure => "pipeline.upstream_failure",
            ErrorKind::UpstreamTimeout => "pipeline.upstream_timeout",
            ErrorKind::ValidationFailure => "pipeline.validation_failure",
            ErrorKind::RenderFailure => "pipeline.render_failure",
        }
    }

    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            Self::UpstreamFailure { provider, .. } | Self::UpstreamTimeout { provider, .. } => {
                Some(*provider)
            }
            _ => None,
        }
    }

    pub fn to_envelope_error(&self) -> EnvelopeError {
        let mut error = EnvelopeError::from_parts(self.code(), self.to_string())
            .with_retryable(self.is_upstream());
        if let Some(provider) = self.provider() {
            error = error.with_source(provider);
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_source_errors_map_to_upstream_timeout() {
        let error = PipelineError::upstream(
            ProviderId::Coinmarketcap,
            "listings",
            SourceError::timeout("deadline elapsed"),
            5_000,
        );

        assert_eq!(error.kind(), ErrorKind::UpstreamTimeout);
        assert!(error.is_upstream());
        assert!(error.to_string().contains("listings"));
    }

    #[test]
    fn envelope_error_carries_code_and_source() {
        let error = PipelineError::upstream(
            ProviderId::Coinmarketcap,
            "global_metrics",
            SourceError::unavailable("status 502"),
            5_000,
        );

        let envelope_error = error.to_envelope_error();
        assert_eq!(envelope_error.code, "pipeline.upstream_failure");
        assert_eq!(envelope_error.source, Some(ProviderId::Coinmarketcap));
        assert_eq!(envelope_error.retryable, Some(true));
    }

    #[test]
    fn validation_errors_are_not_upstream() {
        let error = PipelineError::from(ValidationError::EmptySnapshot);
        assert_eq!(error.kind(), ErrorKind::ValidationFailure);
        assert!(!error.is_upstream());
    }
}
