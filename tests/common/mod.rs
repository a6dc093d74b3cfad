//! Common test utilities for hn-archiver integration tests

use std::path::Path;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hn_archiver::config::{ApiConfig, ArchiveConfig, Config, RetryConfig};

/// Build a config pointing at a mock upstream and per-test scratch files.
///
/// Retries are configured fast and jitter-free so failure-path tests
/// finish quickly and deterministically.
#[allow(dead_code)]
pub fn test_config(
    upstream: &MockServer,
    dir: &Path,
    last_id: u64,
    chunk_size: u64,
    workers: usize,
) -> Config {
    Config {
        api: ApiConfig {
            base_url: upstream.uri(),
            request_timeout: Duration::from_secs(5),
            ..Default::default()
        },
        archive: ArchiveConfig {
            output_path: dir.join("out.tsv"),
            error_log_path: dir.join("errors.txt"),
            chunk_size,
            last_id,
            workers,
        },
        retry: RetryConfig {
            max_attempts: 1,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            backoff_multiplier: 2.0,
            jitter: false,
        },
    }
}

/// Mount a successful comment-shaped item response for one ID.
#[allow(dead_code)]
pub async fn mount_item(server: &MockServer, id: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/item/{id}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": id,
            "type": "comment",
            "by": format!("user{id}"),
            "time": 1_600_000_000 + id as i64,
            "text": format!("comment number {id}"),
            "parent": id.saturating_sub(1),
        })))
        .mount(server)
        .await;
}

/// Mount a custom JSON body for one ID.
#[allow(dead_code)]
pub async fn mount_item_json(server: &MockServer, id: u64, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/item/{id}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount an error status for one ID.
#[allow(dead_code)]
pub async fn mount_item_status(server: &MockServer, id: u64, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/item/{id}.json")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mount successful items for every ID in the range.
#[allow(dead_code)]
pub async fn mount_range(server: &MockServer, ids: std::ops::RangeInclusive<u64>) {
    for id in ids {
        mount_item(server, id).await;
    }
}

/// Read the leading ID column of every line in a snapshot file.
#[allow(dead_code)]
pub async fn read_ids(path: &Path) -> Vec<u64> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .unwrap_or_default();
    contents
        .lines()
        .map(|line| {
            line.split('\t')
                .next()
                .and_then(|field| field.parse().ok())
                .unwrap_or_else(|| panic!("bad leading field in line: {line}"))
        })
        .collect()
}
