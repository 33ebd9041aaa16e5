//! Publish/subscribe seam for post-commit notifications.
//!
//! The bus is never a source of truth: the database is. A failed publish or
//! a missing subscriber has no effect on stored data.

use std::sync::Arc;
use std::sync::mpsc::Receiver;

/// Receiving end handed out by [`EventBus::subscribe`].
///
/// Sees every message published after it was created, in publish order.
#[derive(Debug)]
pub struct Subscription<M> {
    pending: Receiver<M>,
}

impl<M> Subscription<M> {
    pub(crate) fn new(pending: Receiver<M>) -> Self {
        Self { pending }
    }

    /// Next queued message, if any. Never blocks.
    pub fn poll(&self) -> Option<M> {
        self.pending.try_recv().ok()
    }

    /// Every queued message. Never blocks.
    pub fn drain(&self) -> Vec<M> {
        self.pending.try_iter().collect()
    }
}

/// Fan-out of committed changes to optional observers.
///
/// ```text
/// record_usage (commit) → EventBus::publish → subscribers
///                                              └─ ChainLog
/// ```
pub trait EventBus<M>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deliver `message` to every live subscription. Returns how many got it.
    fn publish(&self, message: M) -> Result<usize, Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<usize, Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
