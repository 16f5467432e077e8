//! Plumbing shared by every pipeline stage.

use std::sync::Arc;

use tokio::sync::{Barrier, mpsc};
use tokio_util::sync::CancellationToken;

/// Capacity of every inter-stage channel: at most one element in flight per edge.
pub const HANDOFF_CAPACITY: usize = 1;

/// Start gate and cancellation signal handed to each stage.
#[derive(Debug, Clone)]
pub(crate) struct StageContext {
    start: Arc<Barrier>,
    cancel: CancellationToken,
}

impl StageContext {
    pub(crate) const fn new(start: Arc<Barrier>, cancel: CancellationToken) -> Self {
        Self { start, cancel }
    }

    /// Blocks until every stage and the coordinator have reached the gate.
    pub(crate) async fn ready(&self) {
        self.start.wait().await;
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the run is cancelled.
    pub(crate) async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    /// Receives the next item, or `None` on cancellation or a closed channel.
    pub(crate) async fn receive<T>(&self, rx: &mut mpsc::Receiver<T>) -> Option<T> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            item = rx.recv() => item,
        }
    }

    /// Hands `item` to the next stage, waiting for room unless cancelled.
    pub(crate) async fn handoff<T>(&self, tx: &mpsc::Sender<T>, item: T) -> Handoff {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Handoff::Cancelled,
            sent = tx.send(item) => match sent {
                Ok(()) => Handoff::Delivered,
                Err(_) => Handoff::Closed,
            },
        }
    }
}

/// Outcome of a single send to a downstream stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Handoff {
    Delivered,
    Closed,
    Cancelled,
}
