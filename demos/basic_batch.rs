//! # Example: basic_batch
//!
//! Runs ten simulated downloads with at most three in flight and prints
//! progress as slots settle. Results come back in input order even though
//! latencies are random.
//!
//! ## Flow
//! ```text
//! Processor::process_parallel(urls)
//!   ├─► admit 3 ──► TaskActor::run() ×3
//!   ├─► settle ──► slot[i] ──► on_progress(settled, 10)
//!   ├─► settle #4 ──► on_progressive_ready(&slots)   (once)
//!   └─► admit next until the queue is empty
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic_batch
//! ```

use std::time::Duration;

use batchvisor::{Processor, ProcessorConfig, RunOptions, TaskError, WorkFn};
use rand::Rng;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Three downloads at a time, progressive results after four settle
    let cfg = ProcessorConfig {
        max_concurrency: 3,
        progressive_threshold: 4,
        ..ProcessorConfig::default()
    };
    let processor = Processor::new(cfg)?;

    // 2. Unit of work: "download" a URL, return its byte count
    let download = WorkFn::new("download", |url: String, index: usize| async move {
        let ms = rand::rng().random_range(20..200);
        tokio::time::sleep(Duration::from_millis(ms)).await;
        println!("[download] #{index} {url} took {ms}ms");
        Ok::<_, TaskError>(url.len() * 1024)
    });

    let urls: Vec<String> = (0..10)
        .map(|i| format!("https://cdn.example.net/assets/{i}.bin"))
        .collect();

    // 3. Run with callbacks
    let options = RunOptions::new()
        .on_progress(|settled, total| println!("[progress] {settled}/{total}"))
        .on_progressive_ready(|partial| {
            let ready: Vec<usize> = partial
                .iter()
                .filter(|slot| slot.is_success())
                .map(|slot| slot.index)
                .collect();
            println!("[progressive] first results ready: {ready:?}");
        });

    let results = processor.process_parallel(urls, download, options).await;

    // 4. Slots are aligned with the input
    for slot in &results {
        match (&slot.result, &slot.error) {
            (Some(bytes), _) => println!("[result] #{} {bytes} bytes", slot.index),
            (_, Some(err)) => println!("[result] #{} failed: {err}", slot.index),
            _ => println!("[result] #{} pending", slot.index),
        }
    }

    let stats = processor.stats();
    println!(
        "[stats] {}/{} succeeded ({:.0}%)",
        stats.success_count, stats.total_tasks, stats.success_rate
    );
    Ok(())
}
