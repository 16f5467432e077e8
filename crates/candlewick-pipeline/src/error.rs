//! Pipeline error types.

use candlewick_source::SourceError;
use candlewick_types::Granularity;
use thiserror::Error;

/// Errors that abort a pipeline run before or while it executes.
///
/// Malformed rows, sink write failures and deadline expiry are not errors at
/// this level; they are counted in the [`PipelineReport`](crate::PipelineReport).
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The granularity list is empty.
    #[error("No granularities configured")]
    NoGranularities,

    /// A granularity appears more than once.
    #[error("Duplicate granularity {0}")]
    DuplicateGranularity(Granularity),

    /// The number of sinks does not match the number of granularities.
    #[error("Expected {expected} sinks, one per granularity, got {actual}")]
    SinkCountMismatch {
        /// Configured granularities.
        expected: usize,
        /// Sinks supplied.
        actual: usize,
    },

    /// The source holds no valid trade to date the first session from.
    #[error("Unable to determine session start: input contains no valid trade")]
    NoSessionStart,

    /// The source failed before the first trade could be read.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A stage task panicked or was aborted.
    #[error("{stage} stage failed: {source}")]
    Stage {
        /// Which stage.
        stage: &'static str,
        /// Join failure.
        source: tokio::task::JoinError,
    },
}
