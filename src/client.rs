//! Upstream item endpoint client
//!
//! The upstream exposes only single-ID point lookups
//! (`GET <base>/item/<id>.json`), no batch fetch. [`ItemFetcher`] is the
//! seam workers fetch through; [`HttpItemFetcher`] is the production
//! implementation.

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::types::Item;

/// Abstraction over upstream item lookups, enabling testability.
#[async_trait::async_trait]
pub trait ItemFetcher: Send + Sync {
    /// Fetch a single item by ID.
    ///
    /// An ID the upstream has never assigned resolves to
    /// [`Item::absent`], not an error.
    async fn fetch_item(&self, id: u64) -> Result<Item>;
}

/// Production [`ItemFetcher`] backed by the HTTP item endpoint.
///
/// Every request carries the configured identifying `User-Agent` and
/// `Connection: close`; the connection pool keeps no idle connections, so
/// nothing is reused across requests. High worker counts against the
/// upstream have exhausted its per-client connection tracking when
/// keep-alive was left on.
pub struct HttpItemFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpItemFetcher {
    /// Build a client from the API configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONNECTION,
            reqwest::header::HeaderValue::from_static("close"),
        );

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(0)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ItemFetcher for HttpItemFetcher {
    async fn fetch_item(&self, id: u64) -> Result<Item> {
        let url = format!("{}/item/{}.json", self.base_url, id);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                id,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let item: Option<Item> =
            serde_json::from_str(&body).map_err(|source| Error::Decode { id, source })?;

        // The endpoint answers `null` for IDs that were never assigned;
        // materialize those with the requested ID so the archived line
        // still covers it.
        Ok(item.unwrap_or_else(|| Item::absent(id)))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn fetcher_for(server: &MockServer) -> HttpItemFetcher {
        let config = ApiConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        HttpItemFetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn fetches_and_decodes_an_item() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/item/42.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 42,
                "type": "comment",
                "by": "pg",
                "time": 1_160_000_000,
                "text": "hello",
                "parent": 41
            })))
            .mount(&server)
            .await;

        let item = fetcher_for(&server).await.fetch_item(42).await.unwrap();
        assert_eq!(item.id, 42);
        assert_eq!(item.kind, "comment");
        assert_eq!(item.by, "pg");
        assert_eq!(item.parent, 41);
    }

    #[tokio::test]
    async fn null_body_materializes_as_absent_item() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/item/7.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let item = fetcher_for(&server).await.fetch_item(7).await.unwrap();
        assert_eq!(item, Item::absent(7));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/item/9.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fetcher_for(&server).await.fetch_item(9).await.unwrap_err();
        assert!(matches!(
            err,
            Error::UpstreamStatus { id: 9, status: 503 }
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/item/5.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let err = fetcher_for(&server).await.fetch_item(5).await.unwrap_err();
        assert!(matches!(err, Error::Decode { id: 5, .. }));
    }
}
