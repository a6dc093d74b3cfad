//! Error types for hn-archiver
//!
//! Failures fall into two tiers: fatal errors that abort the run (config
//! validation, opening the output or error-log file, a corrupt resume scan)
//! and chunk-scoped errors that abandon a single chunk while the run
//! continues. Both tiers share this error type; the archiver decides the
//! tier by where the error surfaces.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for hn-archiver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for hn-archiver
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "chunk_size")
        key: Option<String>,
    },

    /// Network error talking to the upstream item endpoint
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream answered with a non-success HTTP status
    #[error("upstream returned status {status} for item {id}")]
    UpstreamStatus {
        /// The item ID that was being fetched
        id: u64,
        /// The HTTP status code returned
        status: u16,
    },

    /// Upstream response body could not be decoded as an item
    #[error("failed to decode item {id}: {source}")]
    Decode {
        /// The item ID that was being fetched
        id: u64,
        /// The underlying JSON error
        source: serde_json::Error,
    },

    /// A line in the existing output file could not be parsed during the
    /// resume scan; continuing would silently under-detect completed work
    #[error("resume scan failed at {path}:{line}: {message}")]
    ResumeScan {
        /// Path of the output file being scanned
        path: PathBuf,
        /// 1-based line number of the offending line
        line: u64,
        /// What was wrong with the line
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A spawned pipeline task panicked or was aborted
    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key.
    pub(crate) fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}
