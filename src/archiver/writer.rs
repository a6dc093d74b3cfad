//! Single-writer append task for the output snapshot.
//!
//! Exactly one instance of this task runs per archive run, and it is the
//! only code holding the output file handle — chunks arrive over a channel
//! from the worker pool, so no lock is needed around the file itself.

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::tsv;
use crate::types::{ChunkId, Item};

/// A fully-fetched chunk handed from a worker to the writer.
///
/// Workers only ever send complete chunks; there is no message for a
/// partial one.
pub(crate) struct CompletedChunk {
    /// Which chunk these items cover
    pub(crate) chunk: ChunkId,
    /// Every item in the chunk's ID range, ascending
    pub(crate) items: Vec<Item>,
}

/// Counts accumulated by the writer over one run.
#[derive(Debug, Default)]
pub(crate) struct WriterStats {
    /// Chunks appended to the output file
    pub(crate) chunks_written: u64,
    /// Item lines appended to the output file
    pub(crate) items_written: u64,
}

/// Consume completed chunks until every sender is dropped, appending each
/// to the output file.
///
/// A chunk's lines are assembled into one buffer and appended with a
/// single write, then flushed before the next chunk is taken. Chunks from
/// different workers may interleave in the file in completion order;
/// completeness detection is ID-based, so file order is irrelevant.
pub(crate) async fn run_writer(
    mut file: tokio::fs::File,
    mut result_rx: mpsc::Receiver<CompletedChunk>,
) -> Result<WriterStats> {
    let mut stats = WriterStats::default();

    while let Some(completed) = result_rx.recv().await {
        let mut buf = String::with_capacity(completed.items.len() * 128);
        for item in &completed.items {
            buf.push_str(&tsv::format_line(item));
            buf.push('\n');
        }

        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;

        stats.chunks_written += 1;
        stats.items_written += completed.items.len() as u64;
        tracing::debug!(
            chunk = completed.chunk.0,
            items = completed.items.len(),
            "Chunk written"
        );
    }

    tracing::info!(
        chunks = stats.chunks_written,
        items = stats.items_written,
        "Writer finished"
    );
    Ok(stats)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    async fn append_handle(path: &std::path::Path) -> tokio::fs::File {
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .unwrap()
    }

    fn chunk_of(chunk: u64, ids: std::ops::RangeInclusive<u64>) -> CompletedChunk {
        CompletedChunk {
            chunk: ChunkId(chunk),
            items: ids
                .map(|id| Item {
                    id,
                    kind: "story".into(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn writes_one_line_per_item_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let (tx, rx) = mpsc::channel(4);

        let writer = tokio::spawn(run_writer(append_handle(&path).await, rx));
        tx.send(chunk_of(0, 1..=3)).await.unwrap();
        drop(tx);
        let stats = writer.await.unwrap().unwrap();

        assert_eq!(stats.chunks_written, 1);
        assert_eq!(stats.items_written, 3);

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let ids: Vec<&str> = contents
            .lines()
            .map(|l| l.split('\t').next().unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn appends_to_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        tokio::fs::write(&path, "999\texisting line\n").await.unwrap();

        let (tx, rx) = mpsc::channel(4);
        let writer = tokio::spawn(run_writer(append_handle(&path).await, rx));
        tx.send(chunk_of(0, 1..=2)).await.unwrap();
        drop(tx);
        writer.await.unwrap().unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.starts_with("999\t"));
    }

    #[tokio::test]
    async fn chunks_are_written_whole_even_when_interleaved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let (tx, rx) = mpsc::channel(4);

        let writer = tokio::spawn(run_writer(append_handle(&path).await, rx));
        // Completion order deliberately differs from chunk order
        tx.send(chunk_of(2, 201..=300)).await.unwrap();
        tx.send(chunk_of(0, 1..=100)).await.unwrap();
        drop(tx);
        let stats = writer.await.unwrap().unwrap();

        assert_eq!(stats.chunks_written, 2);
        assert_eq!(stats.items_written, 200);

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let ids: Vec<u64> = contents
            .lines()
            .map(|l| l.split('\t').next().unwrap().parse().unwrap())
            .collect();
        // Chunk 2's IDs all precede chunk 0's, each ascending internally
        assert_eq!(ids[..100], (201..=300).collect::<Vec<_>>()[..]);
        assert_eq!(ids[100..], (1..=100).collect::<Vec<_>>()[..]);
    }
}
