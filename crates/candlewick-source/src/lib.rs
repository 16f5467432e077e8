//! Trade input parsing and streaming for candlewick.
//!
//! - [`parse_trade`] - Turns one CSV record into a [`Trade`](candlewick_types::Trade)
//! - [`TradeReader`] - Async CSV reader yielding a trade stream

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candlewick/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod parse;
mod reader;

pub use parse::{PRICE_COLUMN, TICKER_COLUMN, TIMESTAMP_COLUMN, parse_trade};
pub use reader::{SourceError, TradeReader, TradeStream};
