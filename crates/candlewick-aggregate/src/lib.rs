//! Session filtering and trade-to-candle aggregation for candlewick.
//!
//! This crate provides the synchronous core of the pipeline:
//!
//! - [`Candle`] - Completed OHLC candle
//! - [`SessionFilter`] - Daily trading-session gate
//! - [`CandleAggregator`] - Per-granularity, per-ticker candle builder

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candlewick/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod candle;
mod filter;

pub use aggregator::CandleAggregator;
pub use candle::Candle;
pub use filter::SessionFilter;
