//! # Reports
//!
//! A [`Report`] composes a [`Snapshot`], an optional [`Insight`] and the
//! triggered [`Alert`]s. [`render`] projects one report value into either
//! rendering:
//!
//! | Format | Output |
//! |--------|--------|
//! | [`ReportFormat::Structured`] | JSON with top-level `meta`, `snapshot`, `insight`, `alerts` |
//! | [`ReportFormat::Text`] | Deterministic Markdown |
//!
//! Rendering validates the report first and produces no output at all when a
//! required field is missing.

mod format;
mod markdown;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use format::{format_count, format_money, format_percent};

use crate::{Alert, Insight, ProviderId, RenderError, Snapshot, UtcDateTime, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub report_id: String,
    pub generated_at: UtcDateTime,
    pub data_sources: Vec<ProviderId>,
    pub generation_ms: u64,
}

impl ReportMeta {
    /// New metadata with a random v4 report id.
    pub fn generate(data_sources: Vec<ProviderId>, generation_ms: u64) -> Self {
        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            generated_at: UtcDateTime::now(),
            data_sources,
            generation_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub snapshot: Snapshot,
    pub insight: Option<Insight>,
    pub alerts: Vec<Alert>,
}

impl Report {
    pub fn new(
        meta: ReportMeta,
        snapshot: Snapshot,
        insight: Option<Insight>,
        alerts: Vec<Alert>,
    ) -> Self {
        Self {
            meta,
            snapshot,
            insight,
            alerts,
        }
    }

    /// Parses the structured rendering back into a report.
    pub fn from_structured(bytes: &[u8]) -> Result<Self, RenderError> {
        let report: Self = serde_json::from_slice(bytes)?;
        report.validate()?;
        Ok(report)
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.meta.report_id.trim().is_empty() {
            return Err(RenderError::MissingField {
                field: "meta.report_id",
            });
        }
        if self.meta.data_sources.is_empty() {
            return Err(RenderError::MissingField {
                field: "meta.data_sources",
            });
        }
        if self.snapshot.sub_views().is_empty() {
            return Err(RenderError::MissingField { field: "snapshot" });
        }
        Ok(())
    }
}

/// Output projection for [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Structured,
    Text,
}

impl ReportFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structured => "json",
            Self::Text => "markdown",
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Structured => "application/json",
            Self::Text => "text/markdown; charset=utf-8",
        }
    }

    pub const fn file_extension(self) -> &'static str {
        match self {
            Self::Structured => "json",
            Self::Text => "md",
        }
    }
}

impl Display for ReportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" | "structured" => Ok(Self::Structured),
            "markdown" | "md" | "text" => Ok(Self::Text),
            other => Err(ValidationError::InvalidFormat {
                value: other.to_owned(),
            }),
        }
    }
}

/// Renders `report` in `format`. Nothing is produced for an invalid report.
pub fn render(report: &Report, format: ReportFormat) -> Result<Vec<u8>, RenderError> {
    report.validate()?;

    match format {
        ReportFormat::Structured => Ok(serde_json::to_vec_pretty(report)?),
        ReportFormat::Text => Ok(markdown::render_markdown(report).into_bytes()),
    }
}
