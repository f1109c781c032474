//! # FeedHub
//!
//! Per-table broadcast of committed row mutations. The store publishes
//! on every commit; every subscriber receives the event, including the
//! writer's own session. Per-row ordering is the publisher's problem:
//! [`MemoryStore`](crate::MemoryStore) publishes under the same guard as
//! the commit, so events for one row arrive in commit order.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::trace;

use domains::error::{FeedError, Result};
use domains::events::{ChangeEvent, TableKind};
use domains::ports::{ChangeFeed, EventSource};

pub struct FeedHub {
    ideas: broadcast::Sender<ChangeEvent>,
    comments: broadcast::Sender<ChangeEvent>,
    votes: broadcast::Sender<ChangeEvent>,
}

impl FeedHub {
    /// `buffer` is the number of undelivered events a slow subscriber may
    /// fall behind before its subscription reports a lag.
    pub fn new(buffer: usize) -> Self {
        Self {
            ideas: broadcast::channel(buffer).0,
            comments: broadcast::channel(buffer).0,
            votes: broadcast::channel(buffer).0,
        }
    }

    fn sender(&self, table: TableKind) -> &broadcast::Sender<ChangeEvent> {
        match table {
            TableKind::Ideas => &self.ideas,
            TableKind::Comments => &self.comments,
            TableKind::Votes => &self.votes,
        }
    }

    /// Fire-and-forget: publishing with no live subscribers is not an
    /// error.
    pub fn publish(&self, event: ChangeEvent) {
        trace!(table = ?event.table, op = ?event.op, "publishing change event");
        let _ = self.sender(event.table).send(event);
    }
}

#[async_trait]
impl ChangeFeed for FeedHub {
    async fn subscribe(&self, table: TableKind) -> Result<Box<dyn EventSource>> {
        Ok(Box::new(BroadcastSource {
            rx: self.sender(table).subscribe(),
        }))
    }
}

/// One subscription; dropping it unsubscribes.
struct BroadcastSource {
    rx: broadcast::Receiver<ChangeEvent>,
}

#[async_trait]
impl EventSource for BroadcastSource {
    async fn next_event(&mut self) -> std::result::Result<ChangeEvent, FeedError> {
        match self.rx.recv().await {
            Ok(event) => Ok(event),
            Err(broadcast::error::RecvError::Lagged(missed)) => Err(FeedError::Lagged(missed)),
            Err(broadcast::error::RecvError::Closed) => Err(FeedError::Closed),
        }
    }
}
