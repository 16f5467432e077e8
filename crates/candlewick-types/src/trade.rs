//! Trade tick representation.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::TradeParseError;

/// Timestamp layout used by trade input rows, e.g. `2024-01-15 07:00:01.250000`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A single executed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Instrument ticker, e.g. `AAPL`.
    pub ticker: String,
    /// Execution price.
    pub price: f64,
    /// Execution time (UTC).
    pub timestamp: DateTime<Utc>,
}

impl Trade {
    /// Creates a new trade.
    #[must_use]
    pub fn new(ticker: impl Into<String>, price: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            ticker: ticker.into(),
            price,
            timestamp,
        }
    }

    /// Builds a trade from its textual fields.
    ///
    /// The timestamp carries no zone and is interpreted as UTC.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticker is empty, the price is not a finite
    /// decimal, or the timestamp does not match [`TIMESTAMP_FORMAT`].
    pub fn from_fields(ticker: &str, price: &str, timestamp: &str) -> Result<Self, TradeParseError> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(TradeParseError::EmptyTicker);
        }

        let price_str = price.trim();
        let price: f64 = price_str
            .parse()
            .map_err(|source| TradeParseError::InvalidPrice {
                value: price_str.to_string(),
                source,
            })?;
        if !price.is_finite() {
            return Err(TradeParseError::NonFinitePrice(price_str.to_string()));
        }

        Ok(Self::new(ticker, price, parse_timestamp(timestamp)?))
    }
}

/// Parses an input timestamp as UTC.
///
/// # Errors
///
/// Returns an error if the string does not match [`TIMESTAMP_FORMAT`].
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, TradeParseError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|source| TradeParseError::InvalidTimestamp {
            value: value.to_string(),
            source,
        })
}
