//! Sink stage: drains one aggregator into one [`CandleSink`].

use candlewick_aggregate::Candle;
use candlewick_format::CandleSink;
use candlewick_types::Granularity;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::stage::StageContext;

/// Sink-side counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SinkStats {
    pub(crate) written: u64,
    pub(crate) write_errors: u64,
}

/// Writes every received candle; a failed write is counted and skipped.
///
/// Runs until the aggregator closes the channel, also after cancellation, so
/// every candle handed off is written or counted as a write error.
pub(crate) async fn run_sink(
    mut rx: mpsc::Receiver<Candle>,
    mut sink: Box<dyn CandleSink>,
    granularity: Granularity,
    ctx: StageContext,
) -> SinkStats {
    ctx.ready().await;
    let mut stats = SinkStats::default();

    while let Some(candle) = rx.recv().await {
        match sink.write(&candle).await {
            Ok(()) => stats.written += 1,
            Err(err) => {
                stats.write_errors += 1;
                error!(%granularity, ticker = %candle.ticker, error = %err, "failed to write candle");
            }
        }
    }

    if let Err(err) = sink.finish().await {
        stats.write_errors += 1;
        error!(%granularity, error = %err, "failed to flush sink");
    }

    debug!(
        %granularity,
        written = stats.written,
        cancelled = ctx.is_cancelled(),
        "sink drained"
    );
    stats
}
