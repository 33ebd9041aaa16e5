//! Process-local bus backed by `std::sync::mpsc` channels.

use std::sync::{Mutex, mpsc};

use thiserror::Error;

use crate::bus::{EventBus, Subscription};

#[derive(Debug, Error)]
pub enum InMemoryBusError {
    #[error("event bus lock poisoned")]
    Poisoned,
}

/// Synchronous fan-out to every live subscription.
///
/// A subscription that was dropped is forgotten on the next publish.
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    senders: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<usize, InMemoryBusError> {
        let mut senders = self
            .senders
            .lock()
            .map_err(|_| InMemoryBusError::Poisoned)?;
        senders.retain(|sender| sender.send(message.clone()).is_ok());
        Ok(senders.len())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (sender, receiver) = mpsc::channel();
        // Poisoned: the subscription stays silent.
        if let Ok(mut senders) = self.senders.lock() {
            senders.push(sender);
        }
        Subscription::new(receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_gets_every_message() {
        let bus = InMemoryEventBus::<u32>::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        assert_eq!(bus.publish(1).unwrap(), 2);
        bus.publish(2).unwrap();

        assert_eq!(a.drain(), vec![1, 2]);
        assert_eq!(b.drain(), vec![1, 2]);
    }

    #[test]
    fn dropped_subscriptions_are_pruned() {
        let bus = InMemoryEventBus::<u32>::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());

        assert_eq!(bus.publish(7).unwrap(), 1);
        assert_eq!(bus.publish(8).unwrap(), 1);

        assert_eq!(kept.poll(), Some(7));
        assert_eq!(kept.poll(), Some(8));
        assert_eq!(kept.poll(), None);
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let bus = InMemoryEventBus::<u32>::new();
        assert_eq!(bus.publish(1).unwrap(), 0);
        let late = bus.subscribe();
        assert_eq!(late.poll(), None);
    }
}
