//! XP-awarded event ingestion.
//!
//! The gamification subsystem publishes fire-and-forget notifications; the
//! league engine consumes them off a bounded channel and feeds
//! `LeagueService::record_xp`. Publishing never blocks the emitter: when the
//! queue is full the event is dropped with a warning, consistent with weekly
//! scores being best-effort.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

use crate::services::league::LeagueService;

/// Emitted when a user completes graded work and earns XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpAwarded {
    pub user_id: Uuid,
    pub amount: i64,
}

/// Bounded, non-blocking publisher handle.
#[derive(Clone)]
pub struct XpEventBus {
    tx: mpsc::Sender<XpAwarded>,
}

impl XpEventBus {
    /// Create a bus and the receiver half for the consumer task.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<XpAwarded>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Publish without blocking. Dropped events are logged, never surfaced
    /// to the emitter.
    pub fn publish(&self, event: XpAwarded) {
        if let Err(e) = self.tx.try_send(event) {
            warn!(user_id = %event.user_id, amount = event.amount, error = %e,
                "dropping xp event: queue unavailable");
        }
    }
}

/// Spawn the consumer loop feeding events into the league service.
pub fn spawn_consumer(
    service: LeagueService,
    mut rx: mpsc::Receiver<XpAwarded>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match service.record_xp(event.user_id, event.amount).await {
                // Ok(None) means the event was dropped and already logged
                Ok(_) => {}
                Err(e) => {
                    warn!(user_id = %event.user_id, amount = event.amount, error = %e,
                        "xp event processing failed");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::league::LeagueConfig;
    use crate::store::LeagueStore;
    use crate::test_support::memory_store::MemoryStore;

    #[tokio::test]
    async fn published_events_reach_the_store() {
        let store = Arc::new(MemoryStore::new());
        let service = LeagueService::new(store.clone(), LeagueConfig::default());
        let (bus, rx) = XpEventBus::new(16);
        let consumer = spawn_consumer(service, rx);

        let user = Uuid::new_v4();
        bus.publish(XpAwarded {
            user_id: user,
            amount: 75,
        });
        drop(bus); // close the channel so the consumer drains and exits
        consumer.await.unwrap();

        let membership = store.get_membership(user).await.unwrap().unwrap();
        assert_eq!(membership.weekly_score, 75);
    }

    #[tokio::test]
    async fn full_queue_drops_without_blocking() {
        let (bus, _rx) = XpEventBus::new(1);
        let event = XpAwarded {
            user_id: Uuid::new_v4(),
            amount: 10,
        };
        bus.publish(event);
        // second publish hits a full queue; must return immediately
        bus.publish(event);
    }
}
