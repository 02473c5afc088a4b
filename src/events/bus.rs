//! # Event bus.
//!
//! [`Bus`] wraps a [`tokio::sync::broadcast`] channel. The processor, every
//! task actor and the subscriber workers publish into it; the subscriber
//! listener and any [`Processor::subscribe`](crate::Processor::subscribe)
//! receiver read from it.
//!
//! ```text
//! TaskActor ─┐
//! run_once  ─┼──► Bus ──► subscriber_listener ──► SubscriberSet
//! Processor ─┘        └──► raw receivers
//! ```
//!
//! Publishing never waits. The channel keeps the last `capacity` events; a
//! receiver that falls further behind gets `RecvError::Lagged(n)` and resumes
//! from the oldest retained event. Events sent while nobody listens are gone.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable handle to the runtime event channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus retaining at most `capacity` events (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Sends `ev` to every current receiver; dropped silently if there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Opens a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of receivers currently attached.
    #[cfg(test)]
    pub(crate) fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
