//! CSV output format.

use candlewick_aggregate::Candle;
use std::io::Write;

use crate::{FormatError, Formatter};

/// Timestamp layout of the candle column.
const CANDLE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// CSV formatter.
///
/// Rows are `ticker,timestamp,open,high,low,close`, timestamps in
/// ISO-8601 UTC. No header is written unless requested.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: char,
    /// Whether to include header row.
    include_header: bool,
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: false,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for CsvFormatter {
    fn write_header<W: Write>(&self, mut writer: W) -> Result<(), FormatError> {
        if self.include_header {
            let d = self.delimiter;
            writeln!(writer, "ticker{d}timestamp{d}open{d}high{d}low{d}close")?;
        }
        Ok(())
    }

    fn write_candle<W: Write>(&self, candle: &Candle, mut writer: W) -> Result<(), FormatError> {
        let d = self.delimiter;
        writeln!(
            writer,
            "{}{d}{}{d}{}{d}{}{d}{}{d}{}",
            candle.ticker,
            candle.bucket_start.format(CANDLE_TIME_FORMAT),
            candle.open,
            candle.high,
            candle.low,
            candle.close
        )?;
        Ok(())
    }

    fn extension(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candlewick_types::Granularity;
    use chrono::{TimeZone, Utc};
    use std::io::Cursor;

    fn create_test_candle() -> Candle {
        Candle {
            ticker: "AAPL".to_string(),
            granularity: Granularity::MINUTE_5,
            bucket_start: Utc.with_ymd_and_hms(2024, 1, 15, 7, 0, 0).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 99.5,
            close: 102.25,
            trade_count: 4,
        }
    }

    #[test]
    fn test_csv_row() {
        let formatter = CsvFormatter::new();
        let mut output = Cursor::new(Vec::new());

        formatter
            .write_candles(&[create_test_candle()], &mut output)
            .unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        assert_eq!(result, "AAPL,2024-01-15T07:00:00Z,100,105,99.5,102.25\n");
    }

    #[test]
    fn test_csv_header() {
        let formatter = CsvFormatter::new().with_header(true);
        let mut output = Cursor::new(Vec::new());

        formatter
            .write_candles(&[create_test_candle()], &mut output)
            .unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        assert!(result.starts_with("ticker,timestamp,open,high,low,close\n"));
    }

    #[test]
    fn test_extension() {
        assert_eq!(CsvFormatter::new().extension(), "csv");
    }

    #[test]
    fn test_custom_delimiter() {
        let formatter = CsvFormatter::new().with_delimiter(';');
        let mut output = Vec::new();

        formatter
            .write_candle(&create_test_candle(), &mut output)
            .unwrap();

        let result = String::from_utf8(output).unwrap();
        assert!(result.starts_with("AAPL;2024-01-15T07:00:00Z;100;"));
    }
}
