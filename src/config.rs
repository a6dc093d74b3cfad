//! Configuration types for hn-archiver

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Upstream API access configuration
///
/// Groups settings for how the archiver talks to the item endpoint.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the item API (default: the official Hacker News Firebase endpoint)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent header sent with every request (default: "hn-archiver/<version>")
    ///
    /// The upstream operators ask bulk clients to identify themselves; an
    /// anonymous agent string risks being rate limited or blocked.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Archive run configuration (paths, ID range, concurrency)
///
/// Groups settings for where the snapshot lives and how the ID space is
/// partitioned. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Output snapshot file, created if missing and only ever appended to
    /// (default: "hndump.tsv")
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Failed-chunk log file, created if missing and only ever appended to
    /// (default: "hndump_error_chunks.txt")
    #[serde(default = "default_error_log_path")]
    pub error_log_path: PathBuf,

    /// Number of item IDs per chunk (default: 100)
    ///
    /// Must evenly divide `last_id`. A chunk is the unit of work, of
    /// failure, and of resumption: it is fetched as a whole, written as a
    /// whole, and abandoned as a whole.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,

    /// Highest item ID to archive (inclusive); the run covers IDs 1..=last_id
    pub last_id: u64,

    /// Number of concurrent fetch workers (default: 32)
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            error_log_path: default_error_log_path(),
            chunk_size: default_chunk_size(),
            last_id: 0,
            workers: default_workers(),
        }
    }
}

/// Retry configuration for transient fetch failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts per item fetch (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 10 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

/// Main configuration for [`Archiver`](crate::Archiver)
///
/// Fields are organized into logical sub-configs:
/// - [`api`](ApiConfig) — upstream endpoint, client identity, timeout
/// - [`archive`](ArchiveConfig) — file paths, ID range, chunking, workers
/// - [`retry`](RetryConfig) — per-fetch backoff policy
///
/// All sub-config fields are flattened for serialization, so the JSON/TOML
/// format stays flat with no nesting.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream API access settings
    #[serde(flatten)]
    pub api: ApiConfig,

    /// Archive run settings (paths, range, concurrency)
    #[serde(flatten)]
    pub archive: ArchiveConfig,

    /// Retry policy for individual item fetches
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Validate the configuration, returning the first violated constraint.
    ///
    /// Checked constraints:
    /// - `last_id` must be greater than zero
    /// - `chunk_size` must be greater than zero and evenly divide `last_id`
    /// - `workers` must be at least 1
    /// - `base_url` must not be empty
    pub fn validate(&self) -> Result<()> {
        if self.archive.last_id == 0 {
            return Err(Error::config("last_id", "last_id must be greater than 0"));
        }
        if self.archive.chunk_size == 0 {
            return Err(Error::config(
                "chunk_size",
                "chunk_size must be greater than 0",
            ));
        }
        if self.archive.last_id % self.archive.chunk_size != 0 {
            return Err(Error::config(
                "chunk_size",
                format!(
                    "chunk_size {} must evenly divide last_id {}",
                    self.archive.chunk_size, self.archive.last_id
                ),
            ));
        }
        if self.archive.workers == 0 {
            return Err(Error::config("workers", "workers must be at least 1"));
        }
        if self.api.base_url.is_empty() {
            return Err(Error::config("base_url", "base_url must not be empty"));
        }
        Ok(())
    }

    /// Total number of chunks covering `1..=last_id`.
    pub fn chunk_count(&self) -> u64 {
        self.archive.last_id / self.archive.chunk_size
    }
}

fn default_base_url() -> String {
    "https://hacker-news.firebaseio.com/v0".to_string()
}

fn default_user_agent() -> String {
    format!("hn-archiver/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_output_path() -> PathBuf {
    PathBuf::from("hndump.tsv")
}

fn default_error_log_path() -> PathBuf {
    PathBuf::from("hndump_error_chunks.txt")
}

fn default_chunk_size() -> u64 {
    100
}

fn default_workers() -> usize {
    32
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
