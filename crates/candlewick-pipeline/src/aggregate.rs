//! Aggregator stage: one per granularity.

use candlewick_aggregate::{Candle, CandleAggregator};
use candlewick_types::Trade;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::stage::StageContext;

/// Folds the branch into candles and hands each completed candle to the sink.
///
/// Cancellation stops the intake of trades only. Candles of a bucket that has
/// already closed are always handed off in full; open candles are flushed at
/// normal end of input and discarded on cancellation. Returns the number of
/// candles handed off.
pub(crate) async fn run_aggregator(
    mut rx: mpsc::Receiver<Trade>,
    tx: mpsc::Sender<Candle>,
    mut aggregator: CandleAggregator,
    ctx: StageContext,
) -> u64 {
    ctx.ready().await;
    let granularity = aggregator.granularity();
    let mut emitted = 0;

    while let Some(trade) = ctx.receive(&mut rx).await {
        let completed = aggregator.process(trade);
        if !emit(&tx, completed, &mut emitted).await {
            return emitted;
        }
    }

    if ctx.is_cancelled() {
        let dropped = aggregator.discard();
        debug!(%granularity, emitted, dropped, "cancelled, open candles discarded");
        return emitted;
    }

    let remaining = aggregator.finish();
    emit(&tx, remaining, &mut emitted).await;
    debug!(%granularity, emitted, "aggregator finished");
    emitted
}

/// Sends completed candles in order; returns false once the sink is gone.
///
/// Not cancellable: the sink keeps draining until this side closes.
async fn emit(tx: &mpsc::Sender<Candle>, candles: Vec<Candle>, emitted: &mut u64) -> bool {
    for candle in candles {
        if tx.send(candle).await.is_err() {
            warn!("sink closed, stopping aggregator");
            return false;
        }
        *emitted += 1;
    }
    true
}
