//! # Example: retry_and_timeout
//!
//! Shows how failed and slow attempts are retried with a fixed delay, how a
//! fatal error skips retries, and how [`process_in_parallel`] drops failures.
//!
//! ## Flow
//! ```text
//! TaskActor::run()
//!   ├─► TaskStarting(attempt=1) ─► run_once() ─► Err / Timeout
//!   ├─► TaskFailed, RetryScheduled(delay=50ms), sleep
//!   ├─► TaskStarting(attempt=2) ─► run_once() ─► Ok
//!   └─► settle slot
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example retry_and_timeout
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use batchvisor::{
    EventKind, Processor, ProcessorConfig, RunOptions, TaskError, WorkFn, process_in_parallel,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = ProcessorConfig {
        max_concurrency: 2,
        retry_attempts: 2,
        retry_delay: Duration::from_millis(50),
        timeout: Some(Duration::from_millis(200)),
        ..ProcessorConfig::default()
    };
    let processor = Processor::new(cfg.clone())?;
    let mut events = processor.subscribe();

    // "flaky" fails its first attempt, "slow" hangs on its first attempt, "corrupt" is fatal.
    let attempts = Arc::new([const { AtomicU32::new(0) }; 4]);
    let work = WorkFn::new("fetch", move |name: &'static str, index: usize| {
        let attempts = Arc::clone(&attempts);
        async move {
            let n = attempts[index].fetch_add(1, Ordering::Relaxed) + 1;
            match name {
                "flaky" if n == 1 => Err(TaskError::fail("connection reset")),
                "slow" if n == 1 => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(name.len())
                }
                "corrupt" => Err(TaskError::fatal("checksum mismatch")),
                _ => Ok(name.len()),
            }
        }
    });

    let results = processor
        .process_parallel(vec!["flaky", "slow", "corrupt", "fine"], work, RunOptions::new())
        .await;

    for slot in &results {
        println!(
            "[result] #{} attempts={} result={:?} error={:?}",
            slot.index,
            slot.attempts,
            slot.result,
            slot.error.as_ref().map(|e| e.as_label())
        );
    }

    while let Ok(ev) = events.try_recv() {
        if matches!(ev.kind, EventKind::RetryScheduled | EventKind::TimeoutHit) {
            println!(
                "[event] {:?} index={:?} attempt={:?} reason={:?}",
                ev.kind, ev.index, ev.attempt, ev.reason
            );
        }
    }

    // Lossy convenience wrapper: only successes, in input order.
    let parse = WorkFn::new("parse", |s: &'static str, _index: usize| async move {
        s.parse::<i64>().map_err(TaskError::fatal)
    });
    let numbers = process_in_parallel(vec!["10", "x", "30"], parse, cfg).await?;
    println!("[lossy] parsed {numbers:?}");
    Ok(())
}
