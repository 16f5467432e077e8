//! Fan-out stage: lock-step replication of the filtered stream.

use candlewick_types::{Granularity, Trade};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::stage::{Handoff, StageContext};

/// Hands each trade to every branch in order before taking the next one.
///
/// A trade counts as delivered only once all live branches accepted it, so the
/// slowest branch paces the whole fan-out. A branch whose receiver is gone is
/// dropped and the others continue. All branches close when this returns.
pub(crate) async fn run_fanout(
    mut rx: mpsc::Receiver<Trade>,
    mut branches: Vec<(Granularity, mpsc::Sender<Trade>)>,
    ctx: StageContext,
) {
    ctx.ready().await;
    debug!(branches = branches.len(), "fan-out started");

    'trades: while let Some(trade) = ctx.receive(&mut rx).await {
        let mut closed = Vec::new();
        for (index, (_, tx)) in branches.iter().enumerate() {
            match ctx.handoff(tx, trade.clone()).await {
                Handoff::Delivered => {}
                Handoff::Closed => closed.push(index),
                Handoff::Cancelled => break 'trades,
            }
        }

        for index in closed.into_iter().rev() {
            let (granularity, _) = branches.remove(index);
            warn!(%granularity, "branch closed, no longer fanning out to it");
        }
        if branches.is_empty() {
            warn!("every branch closed, stopping fan-out");
            break;
        }
    }

    debug!("fan-out finished");
}
