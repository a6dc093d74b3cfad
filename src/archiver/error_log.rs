//! Append-only log of chunks abandoned after a fetch failure.
//!
//! One line per failed chunk: `<chunk index><TAB><error text>`. The log is
//! for operator visibility only — a failed chunk leaves no lines in the
//! output file, so the next run's planner re-offers it without consulting
//! this log.

use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::types::ChunkId;

/// Append-only sink for failed-chunk records.
///
/// The file handle is guarded by a mutex; workers from any task may record
/// failures, but lines are always appended whole.
#[derive(Debug)]
pub(crate) struct ErrorChunkLog {
    file: tokio::sync::Mutex<tokio::fs::File>,
}

impl ErrorChunkLog {
    /// Open (or create) the log for appending. Failure is fatal to the run.
    pub(crate) async fn open(path: &Path) -> Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to open error log '{}': {}", path.display(), e),
                ))
            })?;

        Ok(Self {
            file: tokio::sync::Mutex::new(file),
        })
    }

    /// Append one failed-chunk record.
    pub(crate) async fn record(&self, chunk: ChunkId, error: &Error) -> Result<()> {
        let line = format!("{}\t{}\n", chunk, error);

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
