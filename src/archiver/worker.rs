//! Fetch workers — each pulls one chunk at a time and fetches its IDs
//! sequentially.
//!
//! A chunk either completes in full (every ID fetched) and is handed to
//! the writer as one message, or it is abandoned on the first exhausted
//! fetch and recorded in the error log. A failed chunk never stops the
//! worker; cancellation stops it between fetches without committing
//! anything for the in-flight chunk.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::client::ItemFetcher;
use crate::config::Config;
use crate::error::Result;
use crate::retry::fetch_with_retry;
use crate::types::{ChunkId, Event, Item};

use super::error_log::ErrorChunkLog;
use super::writer::CompletedChunk;

/// Everything one worker task needs, bundled to keep spawn sites readable.
pub(crate) struct WorkerContext {
    /// Worker index (1-based, for logs and events)
    pub(crate) worker: usize,
    pub(crate) config: Arc<Config>,
    pub(crate) fetcher: Arc<dyn ItemFetcher>,
    /// Shared intake of pending chunk indices
    pub(crate) queue: Arc<Mutex<mpsc::Receiver<ChunkId>>>,
    pub(crate) result_tx: mpsc::Sender<CompletedChunk>,
    pub(crate) error_log: Arc<ErrorChunkLog>,
    pub(crate) event_tx: broadcast::Sender<Event>,
    pub(crate) cancel_token: CancellationToken,
}

/// Per-worker counts returned when the worker exits.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct WorkerStats {
    pub(crate) chunks_archived: u64,
    pub(crate) chunks_failed: u64,
}

/// Worker loop: take chunks from the queue until it closes or the run is
/// cancelled.
pub(crate) async fn run_worker(ctx: WorkerContext) -> WorkerStats {
    let mut stats = WorkerStats::default();

    loop {
        let chunk = {
            let mut queue = ctx.queue.lock().await;
            tokio::select! {
                _ = ctx.cancel_token.cancelled() => {
                    tracing::debug!(worker = ctx.worker, "Worker cancelled");
                    return stats;
                }
                chunk = queue.recv() => match chunk {
                    Some(chunk) => chunk,
                    None => {
                        tracing::debug!(worker = ctx.worker, "Queue drained, worker exiting");
                        return stats;
                    }
                },
            }
        };

        ctx.event_tx
            .send(Event::ChunkStarted {
                worker: ctx.worker,
                chunk,
            })
            .ok();

        match fetch_chunk(&ctx, chunk).await {
            Ok(Some(items)) => {
                let item_count = items.len();
                if ctx
                    .result_tx
                    .send(CompletedChunk { chunk, items })
                    .await
                    .is_err()
                {
                    // The writer is gone; nothing further can be committed
                    tracing::error!(
                        worker = ctx.worker,
                        chunk = chunk.0,
                        "Result channel closed, worker exiting"
                    );
                    return stats;
                }
                stats.chunks_archived += 1;
                ctx.event_tx
                    .send(Event::ChunkArchived {
                        worker: ctx.worker,
                        chunk,
                        items: item_count,
                    })
                    .ok();
            }
            Ok(None) => {
                // Cancelled mid-chunk; the chunk committed nothing and will
                // be re-offered by the next run's planner
                tracing::debug!(
                    worker = ctx.worker,
                    chunk = chunk.0,
                    "Chunk abandoned on cancellation"
                );
                return stats;
            }
            Err(e) => {
                stats.chunks_failed += 1;
                tracing::warn!(
                    worker = ctx.worker,
                    chunk = chunk.0,
                    error = %e,
                    "Chunk failed, recording and moving on"
                );
                if let Err(log_err) = ctx.error_log.record(chunk, &e).await {
                    tracing::error!(
                        chunk = chunk.0,
                        error = %log_err,
                        "Failed to record chunk in error log"
                    );
                }
                ctx.event_tx
                    .send(Event::ChunkFailed {
                        worker: ctx.worker,
                        chunk,
                        error: e.to_string(),
                    })
                    .ok();
            }
        }
    }
}

/// Fetch every ID in the chunk's range, ascending, one at a time.
///
/// Returns `Ok(Some(items))` with one item per ID on success, `Ok(None)`
/// if the run was cancelled mid-chunk, and the first exhausted fetch error
/// otherwise. Items fetched before a failure are discarded with the error:
/// the chunk must never be partially visible downstream.
async fn fetch_chunk(ctx: &WorkerContext, chunk: ChunkId) -> Result<Option<Vec<Item>>> {
    let chunk_size = ctx.config.archive.chunk_size;
    let mut items = Vec::with_capacity(chunk_size as usize);

    for id in chunk.ids(chunk_size) {
        if ctx.cancel_token.is_cancelled() {
            return Ok(None);
        }
        let item = fetch_with_retry(&ctx.config.retry, || ctx.fetcher.fetch_item(id)).await?;
        items.push(item);
    }

    Ok(Some(items))
}
