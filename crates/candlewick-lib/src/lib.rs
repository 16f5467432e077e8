//! Trade-to-candle aggregation over a daily trading session.
//!
//! This is a facade crate that re-exports functionality from the candlewick
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use candlewick_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::default();
//!     let mut sinks: Vec<Box<dyn CandleSink>> = Vec::new();
//!     for granularity in &config.granularities {
//!         sinks.push(Box::new(CsvFileSink::create_in(".", *granularity).await?));
//!     }
//!
//!     let trades = TradeReader::open("trades.csv").await?.into_stream();
//!     let report = Pipeline::new(config)?.run(trades, sinks).await?;
//!     println!("wrote {} candles", report.candles_written());
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candlewick/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use candlewick_types::*;

// Re-export aggregation
pub use candlewick_aggregate::{Candle, CandleAggregator, SessionFilter};

// Re-export input
#[cfg(feature = "source")]
pub use candlewick_source::{
    PRICE_COLUMN, SourceError, TICKER_COLUMN, TIMESTAMP_COLUMN, TradeReader, TradeStream,
    parse_trade,
};

// Re-export output
#[cfg(feature = "format")]
pub use candlewick_format::{
    CandleSink, CsvFileSink, CsvFormatter, FormatError, Formatter, MemorySink, SinkError,
    default_file_name,
};

// Re-export the pipeline
#[cfg(feature = "pipeline")]
pub use candlewick_pipeline::{
    BranchReport, CancellationToken, HANDOFF_CAPACITY, Pipeline, PipelineConfig, PipelineError,
    PipelineReport,
};

/// Prelude module for convenient imports.
///
/// ```
/// use candlewick_lib::prelude::*;
/// ```
pub mod prelude {
    pub use candlewick_types::{GapPolicy, Granularity, SessionConfig, SessionWindow, Trade};

    pub use candlewick_aggregate::{Candle, CandleAggregator, SessionFilter};

    #[cfg(feature = "source")]
    pub use candlewick_source::{SourceError, TradeReader};

    #[cfg(feature = "format")]
    pub use candlewick_format::{CandleSink, CsvFileSink, CsvFormatter, default_file_name};

    #[cfg(feature = "pipeline")]
    pub use candlewick_pipeline::{
        CancellationToken, Pipeline, PipelineConfig, PipelineError, PipelineReport,
    };
}
