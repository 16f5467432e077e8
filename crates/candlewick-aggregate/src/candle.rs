//! OHLC candle data structure.

use candlewick_types::Granularity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Completed OHLC candle for one ticker and one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Instrument ticker.
    pub ticker: String,
    /// Width of the bucket this candle summarizes.
    pub granularity: Granularity,
    /// Bucket start (the candle's timestamp).
    pub bucket_start: DateTime<Utc>,
    /// Price of the first trade in the bucket.
    pub open: f64,
    /// Highest traded price.
    pub high: f64,
    /// Lowest traded price.
    pub low: f64,
    /// Price of the last trade in the bucket, by arrival order.
    pub close: f64,
    /// Number of trades folded into the candle.
    pub trade_count: u32,
}

impl Candle {
    /// Returns true if the OHLC ordering invariants hold.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.low <= self.open
            && self.open <= self.high
            && self.low <= self.close
            && self.close <= self.high
    }
}
