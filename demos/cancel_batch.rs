//! # Example: cancel_batch
//!
//! Starts a long batch, cancels it after a few settles and shows that
//! in-flight work still completes while queued items stay pending.
//! Events are written through the built-in [`LogWriter`].
//!
//! ## Flow
//! ```text
//! spawn(process_parallel(20 items, cap=4))
//!   ├─► ... settles ...
//!   ├─► Processor::cancel()  ─► CancelRequested, no more admissions
//!   ├─► in-flight tasks finish and are recorded
//!   └─► RunCompleted(reason="cancelled")
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example cancel_batch --features logging
//! ```

use std::{sync::Arc, time::Duration};

use batchvisor::{
    LogWriter, Processor, ProcessorConfig, RunOptions, RunPhase, Subscribe, TaskError, WorkFn,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let processor = Arc::new(
        Processor::builder(ProcessorConfig {
            max_concurrency: 4,
            ..ProcessorConfig::default()
        })
        .with_subscribers(subs)
        .build()?,
    );

    let work = WorkFn::new("render", |frame: u32, _index: usize| async move {
        tokio::time::sleep(Duration::from_millis(100 + u64::from(frame % 3) * 50)).await;
        Ok::<_, TaskError>(format!("frame-{frame:03}.png"))
    });

    let run = {
        let processor = Arc::clone(&processor);
        tokio::spawn(async move {
            processor
                .process_parallel((0..20).collect::<Vec<u32>>(), work, RunOptions::new())
                .await
        })
    };

    while processor.stats().settled() < 6 {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    processor.cancel();

    let results = run.await?;
    let stats = processor.stats();
    assert_eq!(stats.phase, RunPhase::Completed);
    assert_eq!(stats.active_tasks, 0);

    let pending = results.iter().filter(|slot| !slot.is_settled()).count();
    println!(
        "[summary] rendered={} pending={} rate={:.0}%",
        stats.success_count, pending, stats.success_rate
    );

    processor.shutdown().await;
    Ok(())
}
