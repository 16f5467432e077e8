//! Pipeline coordinator.

use std::sync::Arc;
use std::time::Duration;

use candlewick_aggregate::{CandleAggregator, SessionFilter};
use candlewick_format::CandleSink;
use candlewick_source::SourceError;
use candlewick_types::{SessionWindow, Trade};
use futures::future::join_all;
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::{Barrier, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::aggregate::run_aggregator;
use crate::fanout::run_fanout;
use crate::filter::run_filter;
use crate::sink::run_sink;
use crate::stage::{HANDOFF_CAPACITY, StageContext};
use crate::{BranchReport, PipelineConfig, PipelineError, PipelineReport};

/// Trade-to-candle pipeline.
///
/// Each run builds the full stage graph:
///
/// ```text
/// source -> filter -> fan-out -> aggregator[g] -> sink[g]   (one branch per granularity)
/// ```
///
/// Every stage is its own task. No stage reads a channel until every stage
/// and the coordinator have reached a shared start barrier, and all stages
/// observe one cancellation token driven by the deadline and the caller.
/// Cancellation stops the intake of trades; candles of buckets that already
/// closed are still written, only open candles are dropped.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the pipeline until the source ends or the deadline passes.
    ///
    /// `sinks` pairs up with the configured granularities by position.
    ///
    /// # Errors
    ///
    /// Returns an error if the sinks do not match the granularities, the
    /// source has no valid trade to date the session from, or a stage panics.
    pub async fn run<S>(
        &self,
        source: S,
        sinks: Vec<Box<dyn CandleSink>>,
    ) -> Result<PipelineReport, PipelineError>
    where
        S: Stream<Item = Result<Trade, SourceError>> + Send + Unpin + 'static,
    {
        self.run_until(source, sinks, CancellationToken::new()).await
    }

    /// Like [`run`](Self::run), but also stops when `shutdown` is cancelled.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub async fn run_until<S>(
        &self,
        mut source: S,
        sinks: Vec<Box<dyn CandleSink>>,
        shutdown: CancellationToken,
    ) -> Result<PipelineReport, PipelineError>
    where
        S: Stream<Item = Result<Trade, SourceError>> + Send + Unpin + 'static,
    {
        let branch_count = self.config.granularities.len();
        if sinks.len() != branch_count {
            return Err(PipelineError::SinkCountMismatch {
                expected: branch_count,
                actual: sinks.len(),
            });
        }

        let (session, replay) = self.discover_session(&mut source).await?;
        info!(%session, branches = branch_count, "first session window");
        let source = stream::iter(replay).chain(source);

        let cancel = shutdown.child_token();
        // filter + fan-out + one aggregator and one sink per branch + coordinator
        let parties = 2 * branch_count + 3;
        let ctx = StageContext::new(Arc::new(Barrier::new(parties)), cancel.clone());
        let policy = self.config.gap_policy;

        let (trade_tx, trade_rx) = mpsc::channel(HANDOFF_CAPACITY);
        let filter = SessionFilter::new(session, policy);
        let filter_task = tokio::spawn(run_filter(source, filter, trade_tx, ctx.clone()));

        let mut branch_txs = Vec::with_capacity(branch_count);
        let mut aggregator_tasks = Vec::with_capacity(branch_count);
        let mut sink_tasks = Vec::with_capacity(branch_count);
        for (&granularity, sink) in self.config.granularities.iter().zip(sinks) {
            let (branch_tx, branch_rx) = mpsc::channel(HANDOFF_CAPACITY);
            let (candle_tx, candle_rx) = mpsc::channel(HANDOFF_CAPACITY);
            let aggregator = CandleAggregator::new(granularity, session, policy);

            branch_txs.push((granularity, branch_tx));
            aggregator_tasks.push(tokio::spawn(run_aggregator(
                branch_rx,
                candle_tx,
                aggregator,
                ctx.clone(),
            )));
            sink_tasks.push(tokio::spawn(run_sink(
                candle_rx,
                sink,
                granularity,
                ctx.clone(),
            )));
        }
        let fanout_task = tokio::spawn(run_fanout(trade_rx, branch_txs, ctx.clone()));

        ctx.ready().await;
        debug!(stages = parties - 1, "all stages attached, source released");
        let watchdog = self
            .config
            .deadline
            .map(|deadline| tokio::spawn(watch_deadline(deadline, cancel.clone())));

        // Completion rendezvous: every sink has drained.
        let joined = async {
            let sink_stats = join_stage("sink", sink_tasks, &cancel).await?;
            let emitted = join_stage("aggregator", aggregator_tasks, &cancel).await?;
            join_stage("fan-out", vec![fanout_task], &cancel).await?;
            let filter_stats = join_stage("filter", vec![filter_task], &cancel).await?;
            Ok::<_, PipelineError>((sink_stats, emitted, filter_stats))
        }
        .await;

        if let Some(watchdog) = watchdog {
            watchdog.abort();
        }
        let (sink_stats, emitted, filter_stats) = joined?;
        let filter_stats = filter_stats.into_iter().next().unwrap_or_default();

        let branches = self
            .config
            .granularities
            .iter()
            .zip(emitted)
            .zip(sink_stats)
            .map(|((&granularity, candles_emitted), stats)| BranchReport {
                granularity,
                candles_emitted,
                candles_written: stats.written,
                write_errors: stats.write_errors,
            })
            .collect();

        let report = PipelineReport {
            session,
            trades_read: filter_stats.read,
            trades_admitted: filter_stats.admitted,
            trades_outside_session: filter_stats.outside_session,
            parse_errors: filter_stats.parse_errors,
            source_failed: filter_stats.source_failed,
            cancelled: cancel.is_cancelled(),
            branches,
        };
        info!(
            trades_read = report.trades_read,
            trades_admitted = report.trades_admitted,
            parse_errors = report.parse_errors,
            source_failed = report.source_failed,
            candles_written = report.candles_written(),
            cancelled = report.cancelled,
            "pipeline finished"
        );
        Ok(report)
    }

    /// Dates the first session from the first valid trade.
    ///
    /// Everything read on the way, including skipped rows, is returned for
    /// replay so the filter stage sees the source from its first row.
    async fn discover_session<S>(
        &self,
        source: &mut S,
    ) -> Result<(SessionWindow, Vec<Result<Trade, SourceError>>), PipelineError>
    where
        S: Stream<Item = Result<Trade, SourceError>> + Unpin,
    {
        let mut replay = Vec::new();
        while let Some(item) = source.next().await {
            match item {
                Ok(trade) => {
                    let session = self.config.session.window_for(trade.timestamp.date_naive());
                    replay.push(Ok(trade));
                    return Ok((session, replay));
                }
                Err(err) if err.is_recoverable() => replay.push(Err(err)),
                Err(err) => return Err(err.into()),
            }
        }
        Err(PipelineError::NoSessionStart)
    }
}

/// Cancels the run once `deadline` elapses, unless it was cancelled first.
async fn watch_deadline(deadline: Duration, cancel: CancellationToken) {
    tokio::select! {
        () = cancel.cancelled() => {}
        () = tokio::time::sleep(deadline) => {
            warn!(?deadline, "deadline exceeded, cancelling pipeline");
            cancel.cancel();
        }
    }
}

/// Joins every task of one stage kind, cancelling the run if any failed.
async fn join_stage<T>(
    stage: &'static str,
    tasks: Vec<JoinHandle<T>>,
    cancel: &CancellationToken,
) -> Result<Vec<T>, PipelineError> {
    let mut outputs = Vec::with_capacity(tasks.len());
    for result in join_all(tasks).await {
        match result {
            Ok(output) => outputs.push(output),
            Err(source) => {
                cancel.cancel();
                return Err(PipelineError::Stage { stage, source });
            }
        }
    }
    Ok(outputs)
}
