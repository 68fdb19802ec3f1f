use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data_source::{Capability, CapabilitySet};
use crate::ValidationError;

/// Canonical provider identifiers used in metadata, provenance and envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Alphavantage,
    Coinmarketcap,
    Flippa,
    Godaddy,
}

impl ProviderId {
    pub const ALL: [Self; 4] = [
        Self::Alphavantage,
        Self::Coinmarketcap,
        Self::Flippa,
        Self::Godaddy,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alphavantage => "alphavantage",
            Self::Coinmarketcap => "coinmarketcap",
            Self::Flippa => "flippa",
            Self::Godaddy => "godaddy",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "alphavantage" => Ok(Self::Alphavantage),
            "coinmarketcap" => Ok(Self::Coinmarketcap),
            "flippa" => Ok(Self::Flippa),
            "godaddy" => Ok(Self::Godaddy),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

/// Whether a provider serves live upstream data or deterministic local data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityTier {
    Production,
    Mocked,
}

impl ReliabilityTier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Mocked => "mocked",
        }
    }
}

/// Stated upstream quota: `requests` calls per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub requests: u32,
    #[serde(with = "duration_secs")]
    pub window: Duration,
}

impl RateLimit {
    pub const fn per_minute(requests: u32) -> Self {
        Self {
            requests,
            window: Duration::from_secs(60),
        }
    }
}

/// Immutable description of an upstream source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: &'static str,
    pub capabilities: CapabilitySet,
    pub auth_required: bool,
    pub rate_limit: RateLimit,
    pub tier: ReliabilityTier,
}

impl Provider {
    pub const fn alphavantage(tier: ReliabilityTier) -> Self {
        Self {
            id: ProviderId::Alphavantage,
            name: "Alpha Vantage",
            capabilities: CapabilitySet::only(Capability::Quotes),
            auth_required: true,
            // Free tier: 5 requests per minute.
            rate_limit: RateLimit::per_minute(5),
            tier,
        }
    }

    pub const fn coinmarketcap(tier: ReliabilityTier) -> Self {
        Self {
            id: ProviderId::Coinmarketcap,
            name: "CoinMarketCap",
            capabilities: CapabilitySet::new(false, true, true, false),
            auth_required: true,
            rate_limit: RateLimit::per_minute(30),
            tier,
        }
    }

    pub const fn flippa() -> Self {
        Self {
            id: ProviderId::Flippa,
            name: "Flippa",
            capabilities: CapabilitySet::only(Capability::Listings),
            auth_required: false,
            rate_limit: RateLimit::per_minute(60),
            tier: ReliabilityTier::Mocked,
        }
    }

    pub const fn godaddy() -> Self {
        Self {
            id: ProviderId::Godaddy,
            name: "GoDaddy",
            capabilities: CapabilitySet::new(false, true, false, true),
            auth_required: false,
            rate_limit: RateLimit::per_minute(60),
            tier: ReliabilityTier::Mocked,
        }
    }

    pub const fn is_mocked(&self) -> bool {
        matches!(self.tier, ReliabilityTier::Mocked)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
