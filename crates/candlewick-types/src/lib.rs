//! Core types for the candlewick trade-to-candle pipeline.
//!
//! This crate provides the fundamental data structures used throughout candlewick:
//!
//! - [`Trade`] - A single trade tick with ticker, price and timestamp
//! - [`Granularity`] - Candle width in minutes
//! - [`SessionConfig`] - Daily trading session start-of-day and length
//! - [`SessionWindow`] - One concrete daily trading session
//! - [`TimeBucket`] - One candle-sized slice of a session
//! - [`GapPolicy`] - How windows and buckets advance over data gaps

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candlewick/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bucket;
mod error;
mod granularity;
mod session;
mod trade;

pub use bucket::TimeBucket;
pub use error::{GranularityParseError, SessionConfigError, TradeParseError};
pub use granularity::Granularity;
pub use session::{GapPolicy, SessionConfig, SessionWindow};
pub use trade::{TIMESTAMP_FORMAT, Trade};
