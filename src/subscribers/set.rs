//! # Fan-out of runtime events to subscribers.
//!
//! [`SubscriberSet`] gives every [`Subscribe`] implementation its own bounded
//! queue and worker task, so a slow or broken subscriber never stalls the
//! scheduler or its siblings.
//!
//! ```text
//! emit(&ev) ──try_send──► [queue: log]     ──► worker ──► LogWriter::on_event
//!           ──try_send──► [queue: metrics] ──► worker ──► Metrics::on_event
//!                 │
//!                 └─ full / closed ──► warn + SubscriberOverflow on the bus
//! ```
//!
//! ## Guarantees
//! - Each subscriber sees events in emit order; there is no ordering across subscribers
//! - `emit` never awaits
//! - A full queue drops the event for that subscriber only
//! - A panic in `on_event` is caught, logged and published as `SubscriberPanicked`;
//!   the worker keeps going with the next event
//!
//! Panics are caught through `AssertUnwindSafe`: a subscriber that panics while
//! holding a lock may leave its own state poisoned.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use batchvisor::{Event, EventKind, Processor, ProcessorConfig, Subscribe};
//!
//! struct SettleCounter;
//!
//! #[async_trait::async_trait]
//! impl Subscribe for SettleCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::TaskSettled {
//!             println!("settled {:?}/{:?}", ev.settled, ev.total);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "settle-counter" }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), batchvisor::ConfigError> {
//! let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(SettleCounter)];
//! let processor = Processor::builder(ProcessorConfig::default())
//!     .with_subscribers(subscribers)
//!     .build()?;
//! # processor.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};

use crate::error::panic_message;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Per-subscriber queues and workers.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber. Must be called inside a Tokio runtime.
    ///
    /// Queue sizes come from [`Subscribe::queue_capacity`], raised to 1 if zero.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut lanes = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let (tx, rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            lanes.push(Lane {
                name: sub.name(),
                tx,
            });
            workers.push(spawn_worker(sub, rx, bus.clone()));
        }
        Self {
            lanes,
            workers,
            bus,
        }
    }

    /// Clones `event` once and hands it to every subscriber.
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Hands a shared event to every subscriber without waiting.
    ///
    /// Drops are reported as `SubscriberOverflow`, except when the dropped
    /// event is itself an overflow report (no feedback loop).
    pub fn emit_arc(&self, event: Arc<Event>) {
        let report = event.kind != EventKind::SubscriberOverflow;

        for lane in &self.lanes {
            let reason = match lane.tx.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(TrySendError::Full(_)) => "full",
                Err(TrySendError::Closed(_)) => "closed",
            };
            tracing::warn!(subscriber = lane.name, reason, "subscriber dropped event");
            if report {
                self.bus.publish(Event::subscriber_overflow(lane.name, reason));
            }
        }
    }

    /// Closes every queue and waits for the workers to drain them.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }
}

fn spawn_worker(
    sub: Arc<dyn Subscribe>,
    mut rx: mpsc::Receiver<Arc<Event>>,
    bus: Bus,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            let delivered = AssertUnwindSafe(sub.on_event(ev.as_ref())).catch_unwind().await;
            if let Err(payload) = delivered {
                let info = panic_message(payload.as_ref());
                tracing::warn!(subscriber = sub.name(), panic = %info, "subscriber panicked");
                bus.publish(Event::subscriber_panicked(sub.name(), info));
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().unwrap().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Panicker;

    #[async_trait]
    impl Subscribe for Panicker {
        async fn on_event(&self, _ev: &Event) {
            panic!("subscriber blew up");
        }
        fn name(&self) -> &'static str {
            "panicker"
        }
    }

    #[tokio::test]
    async fn test_fan_out_preserves_per_subscriber_order() {
        let rec = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let set = SubscriberSet::new(vec![rec.clone() as Arc<dyn Subscribe>], Bus::new(16));
        assert_eq!(set.len(), 1);

        set.emit(&Event::new(EventKind::RunStarted));
        set.emit(&Event::new(EventKind::TaskSettled));
        set.emit(&Event::new(EventKind::RunCompleted));
        set.shutdown().await;

        let seen = rec.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                EventKind::RunStarted,
                EventKind::TaskSettled,
                EventKind::RunCompleted
            ]
        );
    }

    #[tokio::test]
    async fn test_panicking_subscriber_is_reported() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Panicker) as Arc<dyn Subscribe>], bus.clone());

        set.emit(&Event::new(EventKind::RunStarted));
        set.shutdown().await;

        let ev = rx.recv().await.expect("panic event");
        assert!(ev.is_subscriber_panic());
        assert_eq!(ev.task.as_deref(), Some("panicker"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber blew up"));
    }
}
