use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{config::ProcessorConfig, processor::Processor};
use crate::{
    error::ConfigError,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Processor`] with optional subscribers.
pub struct ProcessorBuilder {
    cfg: ProcessorConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ProcessorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: ProcessorConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (run lifecycle, attempts, retries)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Validates the configuration and builds the processor.
    ///
    /// With subscribers attached this spawns the listener, so it must be
    /// called from within a Tokio runtime.
    pub fn build(self) -> Result<Processor, ConfigError> {
        self.cfg.validate()?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let token = CancellationToken::new();
        let listener = if self.subscribers.is_empty() {
            None
        } else {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            Some(subscriber_listener(&bus, set, token.clone()))
        };

        Ok(Processor::new_internal(self.cfg, bus, token, listener))
    }
}

/// Forwards bus events to the subscriber set until `token` is cancelled.
///
/// Events already queued on the bus are delivered before the workers stop.
fn subscriber_listener(bus: &Bus, set: SubscriberSet, token: CancellationToken) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = token.cancelled() => break,
            }
        }
        while let Ok(ev) = rx.try_recv() {
            set.emit(&ev);
        }
        set.shutdown().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::RunOptions;
    use crate::error::TaskError;
    use crate::events::{Event, EventKind};
    use crate::tasks::WorkFn;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
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

    #[test]
    fn test_build_rejects_zero_timeout() {
        let cfg = ProcessorConfig {
            timeout: Some(Duration::ZERO),
            ..ProcessorConfig::default()
        };
        assert!(matches!(
            ProcessorBuilder::new(cfg).build(),
            Err(ConfigError::ZeroTimeout)
        ));
    }

    #[tokio::test]
    async fn test_subscribers_see_the_whole_run() {
        let recorder = Arc::new(Recorder::default());
        let processor = Processor::builder(ProcessorConfig::default())
            .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
            .build()
            .unwrap();

        let work = WorkFn::new("echo", |x: u8, _index: usize| async move { Ok::<_, TaskError>(x) });
        processor
            .process_parallel(vec![1, 2, 3], work, RunOptions::new())
            .await;
        processor.shutdown().await;

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.first(), Some(&EventKind::RunStarted));
        assert_eq!(seen.last(), Some(&EventKind::RunCompleted));
        assert_eq!(
            seen.iter().filter(|k| **k == EventKind::TaskStarting).count(),
            3
        );
    }
}
