//! # Subscriber trait.
//!
//! Implement [`Subscribe`] to observe a processor's runs: log them, export
//! metrics, drive a progress bar. The [`SubscriberSet`](crate::SubscriberSet)
//! feeds each subscriber from its own bounded queue on its own worker task,
//! so `on_event` may await freely.
//!
//! When a subscriber cannot keep up and its queue is full, further events for
//! it are dropped and a warning is logged. Size the queue with
//! [`Subscribe::queue_capacity`].
//!
//! ## Example
//! ```rust
//! use batchvisor::{Event, EventKind, Subscribe};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct FailureCounter(AtomicUsize);
//!
//! #[async_trait::async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::TaskFailed {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failure-counter" }
//!     fn queue_capacity(&self) -> usize { 512 }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Receives runtime events on a dedicated worker task.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name used in logs and subscriber events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue length for this subscriber (default 1024).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
