//! Basic archive example
//!
//! This example demonstrates the core functionality of hn-archiver:
//! - Building a configuration
//! - Creating an archiver instance
//! - Subscribing to events
//! - Running a resumable archive pass with signal handling

use hn_archiver::config::{ArchiveConfig, Config};
use hn_archiver::{Event, run_with_shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    // Build configuration: archive the first million items into hndump.tsv
    let config = Config {
        archive: ArchiveConfig {
            output_path: "hndump.tsv".into(),
            error_log_path: "hndump_error_chunks.txt".into(),
            chunk_size: 100,
            last_id: 1_000_000,
            workers: 64,
        },
        ..Default::default()
    };

    // Create archiver instance
    let archiver = hn_archiver::Archiver::new(config)?;

    // Subscribe to events
    let mut events = archiver.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::Planned {
                    total_chunks,
                    completed_chunks,
                    pending_chunks,
                } => {
                    println!(
                        "plan: {pending_chunks} of {total_chunks} chunks pending \
                         ({completed_chunks} already archived)"
                    );
                }
                Event::ChunkArchived { worker, chunk, items } => {
                    println!("worker {worker:3} archived chunk {chunk} ({items} items)");
                }
                Event::ChunkFailed { chunk, error, .. } => {
                    println!("chunk {chunk} failed: {error}");
                }
                Event::RunComplete { summary } => {
                    println!(
                        "done: {} archived, {} failed, {} items written",
                        summary.chunks_archived, summary.chunks_failed, summary.items_written
                    );
                }
                _ => {}
            }
        }
    });

    // Run until complete, or until Ctrl+C cancels cleanly. Interrupted or
    // failed chunks are picked up again simply by rerunning this program.
    let summary = run_with_shutdown(archiver).await?;
    println!(
        "run finished: {}/{} chunks archived this pass",
        summary.chunks_archived,
        summary.chunks_planned - summary.chunks_skipped
    );

    Ok(())
}
