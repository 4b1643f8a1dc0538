//! Change notifications emitted by the stores.
//!
//! UI-layer collections subscribe to keep list views synchronized without
//! polling. Exactly three events exist per store, and delivery order matches
//! mutation order: events are published while the store's write lock is held.

use tokio::sync::broadcast;

use inventory_cache_sdk::EntityId;

/// A store mutation, as observed by subscribers.
#[derive(Debug, Clone)]
pub enum StoreEvent<E> {
    /// An entity entered the active partition (created or restored).
    Added(E),
    /// An active entity was replaced with a newer revision.
    Updated(E),
    /// An entity left the active partition (soft or hard delete). Only the
    /// id is carried; the record may already be gone.
    Deleted(EntityId),
}

/// Broadcast fan-out for one store's events.
///
/// Subscribers that lag more than the channel capacity receive a lag error
/// from the broadcast receiver and are expected to resynchronize by
/// re-reading the store.
#[derive(Debug)]
pub struct EventBus<E> {
    tx: broadcast::Sender<StoreEvent<E>>,
}

impl<E: Clone> EventBus<E> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent<E>> {
        self.tx.subscribe()
    }

    /// Publish an event. A send error only means there are currently no
    /// subscribers, which is not a failure.
    pub fn publish(&self, event: StoreEvent<E>) {
        let _ = self.tx.send(event);
    }
}
