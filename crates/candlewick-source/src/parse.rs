//! Trade row parsing.

use candlewick_types::{Trade, TradeParseError};
use csv_async::StringRecord;

/// Column holding the ticker.
pub const TICKER_COLUMN: usize = 0;
/// Column holding the price.
pub const PRICE_COLUMN: usize = 1;
/// Column holding the timestamp. Column 2 carries no meaning and is ignored.
pub const TIMESTAMP_COLUMN: usize = 3;

/// Parses a single input record into a trade.
///
/// # Errors
///
/// Returns an error if a column is missing or a field is malformed.
pub fn parse_trade(record: &StringRecord) -> Result<Trade, TradeParseError> {
    let ticker = field(record, "ticker", TICKER_COLUMN)?;
    let price = field(record, "price", PRICE_COLUMN)?;
    let timestamp = field(record, "timestamp", TIMESTAMP_COLUMN)?;
    Trade::from_fields(ticker, price, timestamp)
}

#[inline]
fn field<'r>(
    record: &'r StringRecord,
    name: &'static str,
    index: usize,
) -> Result<&'r str, TradeParseError> {
    record
        .get(index)
        .ok_or(TradeParseError::MissingField { name, index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parse_trade() {
        let record = StringRecord::from(vec!["AAPL", "100.5", "17", "2024-01-15 07:00:01.000000"]);
        let trade = parse_trade(&record).unwrap();

        assert_eq!(trade.ticker, "AAPL");
        assert!((trade.price - 100.5).abs() < 1e-10);
        assert_eq!(
            trade.timestamp,
            Utc.with_ymd_and_hms(2024, 1, 15, 7, 0, 1).unwrap()
        );
    }

    #[test]
    fn test_missing_timestamp_column() {
        let record = StringRecord::from(vec!["AAPL", "100.5", "17"]);
        let err = parse_trade(&record).unwrap_err();
        assert_eq!(
            err,
            TradeParseError::MissingField {
                name: "timestamp",
                index: 3
            }
        );
    }

    #[test]
    fn test_malformed_price() {
        let record = StringRecord::from(vec!["AAPL", "1,00", "17", "2024-01-15 07:00:01.000000"]);
        assert!(matches!(
            parse_trade(&record),
            Err(TradeParseError::InvalidPrice { .. })
        ));
    }
}
