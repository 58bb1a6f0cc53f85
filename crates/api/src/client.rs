use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use pocketsync_core::error::RemoteError;

use crate::endpoints;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the Pocket API. Every call is a single POST with a JSON
/// body carrying the consumer key.
#[derive(Clone)]
pub struct PocketClient {
    http: reqwest::Client,
    base: String,
    consumer_key: String,
}

impl PocketClient {
    pub fn new(consumer_key: impl Into<String>) -> Self {
        Self::with_base(endpoints::BASE_URL, consumer_key)
    }

    /// Point the client at a different base URL (proxies, test servers).
    pub fn with_base(base: impl Into<String>, consumer_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            http,
            base: base.into(),
            consumer_key: consumer_key.into(),
        }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, RemoteError> {
        let url = format!("{}{path}", self.base);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .header("Content-Type", "application/json; charset=UTF-8")
            .header("X-Accept", "application/json")
            .send()
            .await
            .map_err(|err| RemoteError::Network(err.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(%url, "rate limited (429)");
            return Err(RemoteError::RateLimited);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            // Pocket sometimes reports its limits through other statuses
            // with an explanatory body.
            if body.to_lowercase().contains("rate limit") {
                warn!(%url, "rate limited (body notice)");
                return Err(RemoteError::RateLimited);
            }
            return Err(RemoteError::Http {
                status: status.as_u16(),
                body,
            });
        }

        debug!(%url, "OK");
        resp.json::<T>()
            .await
            .map_err(|err| RemoteError::Decode(err.to_string()))
    }
}
