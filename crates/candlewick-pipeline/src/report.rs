//! Run summary.

use candlewick_types::{Granularity, SessionWindow};

/// Per-granularity counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchReport {
    /// Granularity of this branch.
    pub granularity: Granularity,
    /// Candles handed from the aggregator to the sink.
    pub candles_emitted: u64,
    /// Candles the sink persisted successfully.
    pub candles_written: u64,
    /// Failed sink writes and flushes.
    pub write_errors: u64,
}

/// Summary of a completed run, returned once every sink has drained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// First session window, dated from the first valid trade.
    pub session: SessionWindow,
    /// Trades parsed from the source.
    pub trades_read: u64,
    /// Trades inside a session window and forwarded downstream.
    pub trades_admitted: u64,
    /// Trades dropped as outside the session window.
    pub trades_outside_session: u64,
    /// Rows skipped because they could not be read or parsed.
    pub parse_errors: u64,
    /// True if an unreadable source ended the input before end of file.
    pub source_failed: bool,
    /// True if the run was cut short by the deadline or the caller.
    pub cancelled: bool,
    /// One entry per granularity, in configuration order.
    pub branches: Vec<BranchReport>,
}

impl PipelineReport {
    /// Total candles written across all branches.
    #[must_use]
    pub fn candles_written(&self) -> u64 {
        self.branches.iter().map(|b| b.candles_written).sum()
    }

    /// Returns the branch report for `granularity`, if configured.
    #[must_use]
    pub fn branch(&self, granularity: Granularity) -> Option<&BranchReport> {
        self.branches.iter().find(|b| b.granularity == granularity)
    }
}
