//! Fan-out delivery of catalog events.
//!
//! A bus gives each subscriber its own queue. Nothing is persisted: events
//! published before a subscription exists are not replayed, and the catalog
//! stays the source of truth. Handlers must tolerate seeing the same change
//! twice; the stock rule does, since re-applying it writes nothing.

use std::sync::mpsc::Receiver;

use crate::event::Event;

/// One consumer's queue of events.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M: Event> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Events already queued; stops at the first empty read.
    pub fn pending(&self) -> impl Iterator<Item = M> + '_ {
        self.receiver.try_iter()
    }

    /// Blocks for each next event; ends once the bus is gone.
    pub fn incoming(&self) -> impl Iterator<Item = M> + '_ {
        self.receiver.iter()
    }
}

/// Publishes catalog events to every live subscription.
pub trait EventBus<M: Event>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn publish(&self, event: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}
