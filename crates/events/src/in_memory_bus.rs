//! Process-local event bus over `std::sync::mpsc`.

use std::sync::{Mutex, mpsc};

use thiserror::Error;
use tracing::{debug, warn};

use crate::bus::{EventBus, Subscription};
use crate::event::Event;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InMemoryBusError {
    #[error("event bus subscriber list poisoned")]
    Poisoned,
}

/// Sends every published event to each subscription created so far.
///
/// Subscriptions whose receiving end was dropped are forgotten on the next
/// publish.
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    senders: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M: Event> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live subscriptions as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.senders.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }
}

impl<M: Event> EventBus<M> for InMemoryEventBus<M> {
    type Error = InMemoryBusError;

    fn publish(&self, event: M) -> Result<(), Self::Error> {
        let mut senders = self
            .senders
            .lock()
            .map_err(|_| InMemoryBusError::Poisoned)?;
        senders.retain(|tx| tx.send(event.clone()).is_ok());
        debug!(
            event_type = event.event_type(),
            subscribers = senders.len(),
            "event published"
        );
        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();
        match self.senders.lock() {
            Ok(mut senders) => senders.push(tx),
            // The subscription is still handed out; it just never receives.
            Err(_) => warn!("event bus poisoned; subscription will stay empty"),
        }
        Subscription::new(rx)
    }
}
