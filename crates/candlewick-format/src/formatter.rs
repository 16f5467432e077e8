//! Output format abstraction.

use candlewick_aggregate::Candle;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during formatting.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for candle formatters.
pub trait Formatter: Send + Sync {
    /// Writes the header row, if this format has one.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_header<W: Write>(&self, writer: W) -> Result<(), FormatError>;

    /// Writes a single candle.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_candle<W: Write>(&self, candle: &Candle, writer: W) -> Result<(), FormatError>;

    /// Writes a header followed by every candle.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_candles<W: Write>(&self, candles: &[Candle], mut writer: W) -> Result<(), FormatError> {
        self.write_header(&mut writer)?;
        for candle in candles {
            self.write_candle(candle, &mut writer)?;
        }
        Ok(())
    }

    /// Returns the file extension for this format.
    fn extension(&self) -> &str;
}
