//! Resume scan — derive the pending chunk set from the existing output file.
//!
//! Chunk completeness is never stored anywhere; it is recomputed here at
//! the start of every run. A chunk counts as complete when any of its IDs
//! appears as the leading field of a line, which is sound because the
//! writer only ever commits chunks whole.

use std::collections::HashSet;
use std::path::Path;

use tokio::io::AsyncBufReadExt;

use crate::error::{Error, Result};
use crate::tsv;
use crate::types::ChunkId;

/// Result of a resume scan: the work left to do this run.
#[derive(Debug)]
pub(crate) struct ChunkPlan {
    /// Chunk indices to fetch, ascending
    pub(crate) pending: Vec<ChunkId>,
    /// Chunks in range already covered by the output file
    pub(crate) completed: u64,
    /// Total chunks in the configured ID range
    pub(crate) total: u64,
}

/// Scan the output file and compute the pending chunk set.
///
/// A missing file means no chunks are complete, not an error. Any line
/// whose leading field is not a valid item ID aborts the scan: continuing
/// with a corrupt file could silently under-detect completed work and
/// duplicate records.
pub(crate) async fn plan_chunks(path: &Path, last_id: u64, chunk_size: u64) -> Result<ChunkPlan> {
    let total = last_id / chunk_size;
    let mut seen: HashSet<ChunkId> = HashSet::new();

    match tokio::fs::File::open(path).await {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No existing output file, starting fresh");
        }
        Err(e) => return Err(e.into()),
        Ok(file) => {
            let mut lines = tokio::io::BufReader::new(file).lines();
            let mut line_number: u64 = 0;
            while let Some(line) = lines.next_line().await? {
                line_number += 1;
                let id = tsv::leading_id(&line).ok_or_else(|| Error::ResumeScan {
                    path: path.to_path_buf(),
                    line: line_number,
                    message: format!(
                        "leading field '{}' is not a valid item ID",
                        line.split('\t').next().unwrap_or_default()
                    ),
                })?;
                if id == 0 {
                    return Err(Error::ResumeScan {
                        path: path.to_path_buf(),
                        line: line_number,
                        message: "item ID 0 is out of range".to_string(),
                    });
                }
                seen.insert(ChunkId::containing(id, chunk_size));
            }
            tracing::info!(
                path = %path.display(),
                lines = line_number,
                chunks_seen = seen.len(),
                "Resume scan complete"
            );
        }
    }

    let pending: Vec<ChunkId> = (0..total)
        .map(ChunkId)
        .filter(|chunk| !seen.contains(chunk))
        .collect();
    let completed = total - pending.len() as u64;

    Ok(ChunkPlan {
        pending,
        completed,
        total,
    })
}
