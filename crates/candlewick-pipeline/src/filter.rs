//! Session filter stage: the only stage that reads the source.

use candlewick_aggregate::SessionFilter;
use candlewick_source::SourceError;
use candlewick_types::Trade;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::stage::{Handoff, StageContext};

/// Source-side counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FilterStats {
    pub(crate) read: u64,
    pub(crate) admitted: u64,
    pub(crate) outside_session: u64,
    pub(crate) parse_errors: u64,
    pub(crate) source_failed: bool,
}

/// Reads trades, forwards those inside the session window, closes `tx` on exit.
pub(crate) async fn run_filter<S>(
    mut source: S,
    mut filter: SessionFilter,
    tx: mpsc::Sender<Trade>,
    ctx: StageContext,
) -> FilterStats
where
    S: Stream<Item = Result<Trade, SourceError>> + Unpin,
{
    ctx.ready().await;
    debug!(session = %filter.window(), "filter started");

    let mut stats = FilterStats::default();
    loop {
        let item = tokio::select! {
            biased;
            () = ctx.cancelled() => break,
            item = source.next() => item,
        };
        let Some(item) = item else {
            debug!("source exhausted");
            break;
        };

        let trade = match item {
            Ok(trade) => trade,
            Err(err) if err.is_recoverable() => {
                stats.parse_errors += 1;
                warn!(error = %err, "skipping malformed trade");
                continue;
            }
            Err(err) => {
                stats.source_failed = true;
                error!(error = %err, "source failed, ending input");
                break;
            }
        };
        stats.read += 1;

        let before = filter.window();
        let admitted = filter.admit(trade.timestamp);
        if filter.window() != before {
            debug!(session = %filter.window(), "session window advanced");
        }
        if !admitted {
            stats.outside_session += 1;
            continue;
        }

        stats.admitted += 1;
        match ctx.handoff(&tx, trade).await {
            Handoff::Delivered => {}
            Handoff::Closed => {
                warn!("fan-out closed, stopping source");
                break;
            }
            Handoff::Cancelled => break,
        }
    }

    if ctx.is_cancelled() {
        warn!(admitted = stats.admitted, "input cut short by cancellation");
    }
    stats
}
