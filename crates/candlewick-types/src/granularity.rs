//! Candle granularity definitions.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::GranularityParseError;

/// Width of a candle bucket, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Granularity(NonZeroU32);

impl Granularity {
    /// 5-minute candles.
    pub const MINUTE_5: Self = Self(NonZeroU32::new(5).unwrap());
    /// 30-minute candles.
    pub const MINUTE_30: Self = Self(NonZeroU32::new(30).unwrap());
    /// 240-minute (4-hour) candles.
    pub const MINUTE_240: Self = Self(NonZeroU32::new(240).unwrap());

    /// The default set of granularities, in output order.
    pub const STANDARD: [Self; 3] = [Self::MINUTE_5, Self::MINUTE_30, Self::MINUTE_240];

    /// Creates a granularity of `minutes` minutes, or `None` for zero.
    #[must_use]
    pub const fn new(minutes: u32) -> Option<Self> {
        match NonZeroU32::new(minutes) {
            Some(m) => Some(Self(m)),
            None => None,
        }
    }

    /// Returns the width in minutes.
    #[must_use]
    pub const fn minutes(&self) -> u32 {
        self.0.get()
    }

    /// Returns the width as a time delta.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.minutes()))
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m", self.minutes())
    }
}

impl From<Granularity> for u32 {
    fn from(value: Granularity) -> Self {
        value.minutes()
    }
}

impl TryFrom<u32> for Granularity {
    type Error = GranularityParseError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| GranularityParseError(value.to_string()))
    }
}

impl FromStr for Granularity {
    type Err = GranularityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let err = || GranularityParseError(s.to_string());

        let (digits, per_unit) = if let Some(rest) = lower.strip_suffix('m') {
            (rest, 1)
        } else if let Some(rest) = lower.strip_prefix('m') {
            (rest, 1)
        } else if let Some(rest) = lower.strip_suffix('h') {
            (rest, 60)
        } else if let Some(rest) = lower.strip_prefix('h') {
            (rest, 60)
        } else {
            (lower.as_str(), 1)
        };

        let value: u32 = digits.parse().map_err(|_| err())?;
        value
            .checked_mul(per_unit)
            .and_then(Self::new)
            .ok_or_else(err)
    }
}
