//! Concurrent trade-to-candle pipeline for candlewick.
//!
//! - [`Pipeline`] - Builds, starts and joins the stage graph
//! - [`PipelineConfig`] - Granularities, session, deadline and gap policy
//! - [`PipelineReport`] - Counters returned once every sink has drained

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candlewick/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregate;
mod config;
mod error;
mod fanout;
mod filter;
mod pipeline;
mod report;
mod sink;
mod stage;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::Pipeline;
pub use report::{BranchReport, PipelineReport};
pub use stage::HANDOFF_CAPACITY;
pub use tokio_util::sync::CancellationToken;
