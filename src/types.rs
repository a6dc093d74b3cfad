//! Core types for hn-archiver

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Index of a fixed-size chunk of the item ID space
///
/// Chunk `k` covers the ID range `[k*S + 1, k*S + S]` for chunk size `S`.
/// Chunks have no persisted state of their own; whether a chunk is complete
/// is derived from the output file at planning time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(pub u64);

impl ChunkId {
    /// First item ID covered by this chunk.
    pub fn first_id(&self, chunk_size: u64) -> u64 {
        self.0 * chunk_size + 1
    }

    /// Last item ID covered by this chunk (inclusive).
    pub fn last_id(&self, chunk_size: u64) -> u64 {
        self.0 * chunk_size + chunk_size
    }

    /// Inclusive range of item IDs covered by this chunk.
    pub fn ids(&self, chunk_size: u64) -> RangeInclusive<u64> {
        self.first_id(chunk_size)..=self.last_id(chunk_size)
    }

    /// The chunk containing the given item ID.
    ///
    /// Item IDs start at 1; ID `S` still belongs to chunk 0.
    pub fn containing(id: u64, chunk_size: u64) -> Self {
        debug_assert!(id >= 1, "item IDs start at 1");
        Self((id - 1) / chunk_size)
    }
}

impl From<u64> for ChunkId {
    fn from(index: u64) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One upstream item record
///
/// Mirrors the JSON shape of the item endpoint. Every field except `id` is
/// absent for some item kinds (and for deleted items almost all are), so
/// everything decodes to its zero value when missing. Items are immutable
/// once fetched; the archiver never rewrites a stored record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item ID, assigned monotonically upstream and never reused
    pub id: u64,

    /// True if the item was removed by moderation
    #[serde(default)]
    pub deleted: bool,

    /// Item kind: "story", "comment", "job", "poll", "pollopt"
    #[serde(default, rename = "type")]
    pub kind: String,

    /// Username of the author
    #[serde(default)]
    pub by: String,

    /// Creation time, Unix seconds
    #[serde(default)]
    pub time: i64,

    /// Comment or story text (HTML)
    #[serde(default)]
    pub text: String,

    /// True if the item was removed by its author
    #[serde(default)]
    pub dead: bool,

    /// Parent item ID (comments only)
    #[serde(default)]
    pub parent: u64,

    /// Associated poll ID (poll options only)
    #[serde(default)]
    pub poll: u64,

    /// IDs of direct children, in display order
    #[serde(default)]
    pub kids: Vec<u64>,

    /// Story URL
    #[serde(default)]
    pub url: String,

    /// Score (stories) or votes (poll options)
    #[serde(default)]
    pub score: i64,

    /// Story, poll, or job title
    #[serde(default)]
    pub title: String,

    /// IDs of poll options (polls only)
    #[serde(default)]
    pub parts: Vec<u64>,

    /// Total comment count (stories and polls)
    #[serde(default)]
    pub descendants: u64,
}

impl Item {
    /// The record materialized for an ID whose upstream body is `null`.
    ///
    /// The upstream answers `null` for IDs that were never assigned. The
    /// archived line must still carry the requested ID so the resume scan
    /// sees the chunk as covered; every other field stays zero.
    pub fn absent(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// Progress events emitted during an archive run
///
/// Events are advisory: subscribers may lag or be absent entirely without
/// affecting the run. Subscribe via [`Archiver::subscribe`](crate::Archiver::subscribe).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Resume scan finished and the pending set is fixed
    Planned {
        /// Total chunks in the configured ID range
        total_chunks: u64,
        /// Chunks already present in the output file
        completed_chunks: u64,
        /// Chunks that will be fetched this run
        pending_chunks: u64,
    },

    /// A worker picked up a chunk
    ChunkStarted {
        /// Worker index (1-based)
        worker: usize,
        /// Chunk being fetched
        chunk: ChunkId,
    },

    /// A chunk was fetched completely and handed to the writer
    ChunkArchived {
        /// Worker index (1-based)
        worker: usize,
        /// Chunk that completed
        chunk: ChunkId,
        /// Number of items in the chunk
        items: usize,
    },

    /// A chunk was abandoned after a fetch failure
    ChunkFailed {
        /// Worker index (1-based)
        worker: usize,
        /// Chunk that failed
        chunk: ChunkId,
        /// Description of the failure
        error: String,
    },

    /// The run finished (all pending chunks either archived or failed)
    RunComplete {
        /// Final counts for the run
        summary: RunSummary,
    },
}

/// Final counts for one archive run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Total chunks in the configured ID range
    pub chunks_planned: u64,
    /// Chunks skipped because the output file already covered them
    pub chunks_skipped: u64,
    /// Chunks fetched and written this run
    pub chunks_archived: u64,
    /// Chunks abandoned and recorded in the error log this run
    pub chunks_failed: u64,
    /// Item lines appended to the output file this run
    pub items_written: u64,
}
