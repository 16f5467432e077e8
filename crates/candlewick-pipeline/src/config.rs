//! Pipeline configuration.

use std::collections::HashSet;
use std::time::Duration;

use candlewick_types::{GapPolicy, Granularity, SessionConfig};

use crate::PipelineError;

/// Configuration for a [`Pipeline`](crate::Pipeline) run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Candle granularities, one aggregator and sink per entry, in this order.
    pub granularities: Vec<Granularity>,
    /// Daily trading session.
    pub session: SessionConfig,
    /// Upper bound on how long the source keeps producing. `None` runs to end of input.
    pub deadline: Option<Duration>,
    /// How windows and buckets advance over gaps in the data.
    pub gap_policy: GapPolicy,
}

impl PipelineConfig {
    /// Default run deadline.
    pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

    /// Checks that the granularity list is non-empty and free of duplicates.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first problem found.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.granularities.is_empty() {
            return Err(PipelineError::NoGranularities);
        }
        let mut seen = HashSet::new();
        for granularity in &self.granularities {
            if !seen.insert(*granularity) {
                return Err(PipelineError::DuplicateGranularity(*granularity));
            }
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            granularities: Granularity::STANDARD.to_vec(),
            session: SessionConfig::default(),
            deadline: Some(Self::DEFAULT_DEADLINE),
            gap_policy: GapPolicy::default(),
        }
    }
}
