use serde::{Deserialize, Serialize};

use super::numeric::validate_not_blank;
use crate::ValidationError;

/// Overall market direction reported by an insight producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        }
    }
}

/// Narrative summary over a snapshot, produced outside the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub summary: String,
    pub sentiment: Sentiment,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
    /// Producer confidence, `0..=100`.
    pub confidence: u8,
}

impl Insight {
    pub fn new(
        summary: impl Into<String>,
        sentiment: Sentiment,
        key_points: Vec<String>,
        risks: Vec<String>,
        opportunities: Vec<String>,
        confidence: u8,
    ) -> Result<Self, ValidationError> {
        let summary = summary.into();
        validate_not_blank("summary", &summary)?;
        if confidence > 100 {
            return Err(ValidationError::ConfidenceOutOfRange { value: confidence });
        }

        Ok(Self {
            summary,
            sentiment,
            key_points,
            risks,
            opportunities,
            confidence,
        })
    }
}
