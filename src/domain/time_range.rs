// Query window expressed as an InfluxQL duration literal
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::error::ConfigError;

/// A look-back window such as `60m` or `6h`.
///
/// Keeps the literal as written so it can be embedded verbatim in a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    literal: String,
    duration: Duration,
}

impl TimeRange {
    pub fn as_literal(&self) -> &str {
        &self.literal
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self {
            literal: "60m".to_string(),
            duration: Duration::from_secs(60 * 60),
        }
    }
}

impl FromStr for TimeRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let literal = s.trim();
        let split = literal
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| ConfigError::InvalidTimeRange(s.to_string()))?;
        let (amount, unit) = literal.split_at(split);

        let amount: u64 = amount
            .parse()
            .map_err(|_| ConfigError::InvalidTimeRange(s.to_string()))?;
        let seconds_per_unit = match unit {
            "s" => 1,
            "m" => 60,
            "h" => 60 * 60,
            "d" => 24 * 60 * 60,
            "w" => 7 * 24 * 60 * 60,
            _ => return Err(ConfigError::InvalidTimeRange(s.to_string())),
        };
        if amount == 0 {
            return Err(ConfigError::InvalidTimeRange(s.to_string()));
        }

        let seconds = amount
            .checked_mul(seconds_per_unit)
            .ok_or_else(|| ConfigError::InvalidTimeRange(s.to_string()))?;

        Ok(Self {
            literal: literal.to_string(),
            duration: Duration::from_secs(seconds),
        })
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

impl<'de> Deserialize<'de> for TimeRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
