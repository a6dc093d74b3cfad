//! # hn-archiver
//!
//! Resumable bulk archiver library for the Hacker News item API.
//!
//! ## Design Philosophy
//!
//! hn-archiver is designed to be:
//! - **Resumable** - reruns skip everything the output file already covers
//! - **Append-only** - the snapshot is never truncated or rewritten
//! - **Library-first** - no CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - consumers subscribe to progress events, no polling
//!
//! The ID space is split into fixed-size chunks; a bounded pool of workers
//! fetches each chunk's items one ID at a time, and a single writer task
//! appends completed chunks to a tab-delimited snapshot. A chunk that
//! fails mid-fetch commits nothing and is retried automatically on the
//! next run, because the planner derives completed chunks from the
//! snapshot itself.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hn_archiver::{Archiver, ArchiveConfig, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         archive: ArchiveConfig {
//!             last_id: 1_000_000,
//!             workers: 64,
//!             ..Default::default()
//!         },
//!         ..Default::default()
//!     };
//!
//!     let archiver = Archiver::new(config)?;
//!
//!     // Subscribe to progress events
//!     let mut events = archiver.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = archiver.run().await?;
//!     println!("archived {} items", summary.items_written);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Core archiver implementation (decomposed into focused submodules)
pub mod archiver;
/// Upstream item endpoint client
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Retry logic with exponential backoff
pub mod retry;
/// Tab-delimited snapshot line format
pub mod tsv;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use archiver::Archiver;
pub use client::{HttpItemFetcher, ItemFetcher};
pub use config::{ApiConfig, ArchiveConfig, Config, RetryConfig};
pub use error::{Error, Result};
pub use types::{ChunkId, Event, Item, RunSummary};

/// Helper function to run the archiver with graceful signal handling.
///
/// Runs a full archive pass while listening for a termination signal; on
/// signal the run is cancelled cleanly (in-flight chunks are abandoned
/// without committing partial output) and the partial summary is returned.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use hn_archiver::{Archiver, ArchiveConfig, Config, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config {
///         archive: ArchiveConfig { last_id: 100_000, ..Default::default() },
///         ..Default::default()
///     };
///     let archiver = Archiver::new(config)?;
///
///     // Run with automatic signal handling
///     let summary = run_with_shutdown(archiver).await?;
///     println!("archived {} chunks", summary.chunks_archived);
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(archiver: Archiver) -> Result<RunSummary> {
    let signal_target = archiver.clone();
    let signal_task = tokio::spawn(async move {
        wait_for_signal().await;
        signal_target.shutdown();
    });

    let summary = archiver.run().await;
    signal_task.abort();
    summary
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
