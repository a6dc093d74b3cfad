//! Core archiver implementation split into focused submodules.
//!
//! The `Archiver` struct and the run pipeline are organized by role:
//! - [`planner`] - resume scan and pending-set computation
//! - [`worker`] - chunk fetch workers
//! - [`writer`] - single-writer output append task
//! - [`error_log`] - failed-chunk log
//!
//! One run wires them as: planner → dispatcher → worker pool → writer
//! (success path) / error log (failure path). All cross-task communication
//! goes through channels; the pending set is computed once before any
//! worker starts and never mutated.

mod error_log;
mod planner;
mod worker;
mod writer;

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::client::{HttpItemFetcher, ItemFetcher};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{ChunkId, Event, RunSummary};

use error_log::ErrorChunkLog;
use writer::CompletedChunk;

/// Buffered events per subscriber before a slow subscriber starts lagging
const EVENT_CHANNEL_BUFFER: usize = 1000;

/// Main archiver instance (cloneable - all fields are Arc-wrapped)
///
/// Create with [`Archiver::new`], subscribe to progress with
/// [`subscribe`](Archiver::subscribe), then call [`run`](Archiver::run).
/// A run fetches every pending chunk of the configured ID range and
/// appends the results to the output file; rerunning against the same
/// file skips everything already archived.
#[derive(Clone)]
pub struct Archiver {
    /// Configuration (wrapped in Arc for sharing across tasks)
    config: Arc<Config>,
    /// Upstream item fetcher (trait object for pluggable implementations)
    fetcher: Arc<dyn ItemFetcher>,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: broadcast::Sender<Event>,
    /// Cancellation token observed by the dispatcher and all workers
    cancel_token: CancellationToken,
}

impl std::fmt::Debug for Archiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archiver")
            .field("config", &self.config)
            .field("fetcher", &"<dyn ItemFetcher>")
            .finish()
    }
}

impl Archiver {
    /// Create a new archiver with the production HTTP fetcher.
    ///
    /// Validates the configuration and builds the HTTP client; both can
    /// fail, nothing else here does.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = Arc::new(HttpItemFetcher::new(&config.api)?);
        Ok(Self::assemble(config, fetcher))
    }

    /// Create an archiver with a custom [`ItemFetcher`] implementation.
    ///
    /// Intended for embedders that already own an HTTP stack, and for
    /// tests that substitute a deterministic fetcher.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn ItemFetcher>) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, fetcher))
    }

    fn assemble(config: Config, fetcher: Arc<dyn ItemFetcher>) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_BUFFER);
        Self {
            config: Arc::new(config),
            fetcher,
            event_tx,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Subscribe to archive events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. Events are advisory — a lagging or absent subscriber
    /// never affects the run.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Request cancellation of the current run.
    ///
    /// The dispatcher stops feeding chunks and each worker stops at its
    /// next check. An in-flight chunk is abandoned without committing any
    /// output, so it is safe to retry on the next run.
    pub fn shutdown(&self) {
        tracing::info!("Shutdown requested, cancelling run");
        self.cancel_token.cancel();
    }

    /// Execute one archive run and return the final counts.
    ///
    /// Fatal errors (config-level file problems, a corrupt resume scan)
    /// abort the run; individual chunk failures are recorded in the error
    /// log and reflected in the summary instead.
    pub async fn run(&self) -> Result<RunSummary> {
        let archive = &self.config.archive;

        let plan = planner::plan_chunks(
            &archive.output_path,
            archive.last_id,
            archive.chunk_size,
        )
        .await?;
        tracing::info!(
            total_chunks = plan.total,
            completed_chunks = plan.completed,
            pending_chunks = plan.pending.len(),
            "Chunk plan computed"
        );
        self.event_tx
            .send(Event::Planned {
                total_chunks: plan.total,
                completed_chunks: plan.completed,
                pending_chunks: plan.pending.len() as u64,
            })
            .ok();

        let mut summary = RunSummary {
            chunks_planned: plan.total,
            chunks_skipped: plan.completed,
            ..Default::default()
        };

        if plan.pending.is_empty() {
            tracing::info!("Nothing pending, archive is already complete");
            self.event_tx.send(Event::RunComplete { summary }).ok();
            return Ok(summary);
        }

        // Open both sinks before any fetch starts; failure here is fatal
        let error_log = Arc::new(ErrorChunkLog::open(&archive.error_log_path).await?);
        let output = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&archive.output_path)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "failed to open output file '{}': {}",
                        archive.output_path.display(),
                        e
                    ),
                ))
            })?;

        let workers = archive.workers;
        let (chunk_tx, chunk_rx) = mpsc::channel::<ChunkId>(workers * 2);
        let (result_tx, result_rx) = mpsc::channel::<CompletedChunk>(workers);

        // The writer owns the output handle exclusively for the whole run
        let writer_task = tokio::spawn(writer::run_writer(output, result_rx));

        // Dispatcher: feed every pending index, then close the intake by
        // dropping the sender
        let pending = plan.pending;
        let dispatch_cancel = self.cancel_token.clone();
        let dispatcher = tokio::spawn(async move {
            for chunk in pending {
                tokio::select! {
                    _ = dispatch_cancel.cancelled() => break,
                    sent = chunk_tx.send(chunk) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        let queue = Arc::new(Mutex::new(chunk_rx));
        let mut worker_handles = Vec::with_capacity(workers);
        for worker_id in 1..=workers {
            let ctx = worker::WorkerContext {
                worker: worker_id,
                config: Arc::clone(&self.config),
                fetcher: Arc::clone(&self.fetcher),
                queue: Arc::clone(&queue),
                result_tx: result_tx.clone(),
                error_log: Arc::clone(&error_log),
                event_tx: self.event_tx.clone(),
                cancel_token: self.cancel_token.clone(),
            };
            worker_handles.push(tokio::spawn(worker::run_worker(ctx)));
        }
        // Workers hold the only remaining result senders; once they all
        // exit the writer sees the channel close and drains out
        drop(result_tx);

        for handle in futures::future::join_all(worker_handles).await {
            let stats = handle?;
            summary.chunks_archived += stats.chunks_archived;
            summary.chunks_failed += stats.chunks_failed;
        }
        dispatcher.await?;

        let writer_stats = writer_task.await??;
        summary.items_written = writer_stats.items_written;

        tracing::info!(
            chunks_archived = summary.chunks_archived,
            chunks_failed = summary.chunks_failed,
            items_written = summary.items_written,
            "Archive run finished"
        );
        self.event_tx.send(Event::RunComplete { summary }).ok();
        Ok(summary)
    }
}
