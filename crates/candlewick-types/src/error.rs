//! Error types for candlewick core types.

use std::num::ParseFloatError;
use thiserror::Error;

/// Errors that can occur while turning raw input fields into a [`Trade`](crate::Trade).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TradeParseError {
    /// A required column is absent from the input row.
    #[error("Missing field {name} (column {index})")]
    MissingField {
        /// Column name.
        name: &'static str,
        /// Zero-based column index.
        index: usize,
    },

    /// Ticker column is empty.
    #[error("Empty ticker")]
    EmptyTicker,

    /// Price is not a decimal number.
    #[error("Invalid price '{value}': {source}")]
    InvalidPrice {
        /// The offending text.
        value: String,
        /// Underlying parse failure.
        source: ParseFloatError,
    },

    /// Price parsed to NaN or infinity.
    #[error("Non-finite price '{0}'")]
    NonFinitePrice(String),

    /// Timestamp does not match the expected layout.
    #[error("Invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        /// The offending text.
        value: String,
        /// Underlying parse failure.
        source: chrono::ParseError,
    },
}

/// Error returned when parsing an invalid granularity string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid granularity '{0}', expected minutes such as 5, 30m, m30 or 4h")]
pub struct GranularityParseError(pub(crate) String);

/// Errors for an unusable session configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionConfigError {
    /// Session length is zero or negative.
    #[error("Session length must be positive, got {minutes} minutes")]
    NonPositiveLength {
        /// Configured length in minutes.
        minutes: i64,
    },

    /// Session length would make consecutive daily windows overlap.
    #[error("Session length must be shorter than a day, got {minutes} minutes")]
    LongerThanDay {
        /// Configured length in minutes.
        minutes: i64,
    },
}
