//! Candle output formatting and sinks for candlewick.
//!
//! - [`CsvFormatter`] - Candle rows as delimited text
//! - [`CandleSink`] - Async destination for completed candles
//! - [`CsvFileSink`] - One CSV file per granularity
//! - [`MemorySink`] - In-memory collector

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candlewick/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod formatter;
mod sink;

pub use crate::csv::CsvFormatter;
pub use formatter::{FormatError, Formatter};
pub use sink::{CandleSink, CsvFileSink, MemorySink, SinkError, default_file_name};
