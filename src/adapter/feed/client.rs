//! HTTP live source.
//!
//! One GET per poll against the configured endpoint. Retrying is the poll
//! loop's job, so a failed request is returned as-is.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::debug;
use url::Url;

use super::envelope::FeedEnvelope;
use super::settings::FeedConfig;
use crate::error::{FetchError, Result};
use crate::port::{LiveEvent, LiveSource};

/// Live source backed by the public feed endpoint.
pub struct HttpLiveSource {
    http: HttpClient,
    url: Url,
    sport_id: u64,
}

impl HttpLiveSource {
    /// Build the client and the full request URL.
    ///
    /// # Errors
    /// Returns an error if the endpoint is not a valid URL or the HTTP
    /// client cannot be constructed.
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        let mut url = Url::parse(&config.url)?;
        url.query_pairs_mut()
            .append_pair("sports", &config.sport_id.to_string())
            .append_pair("count", &config.count.to_string())
            .append_pair("lng", &config.language);

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url,
            sport_id: config.sport_id,
        })
    }

    /// Full request URL, query included.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Decode a response body into live events.
    ///
    /// # Errors
    /// Returns [`FetchError::Decode`] when the body is not a JSON envelope.
    pub fn decode(&self, body: &[u8]) -> std::result::Result<Vec<LiveEvent>, FetchError> {
        let envelope: FeedEnvelope =
            serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(envelope.into_events(self.sport_id))
    }
}

#[async_trait]
impl LiveSource for HttpLiveSource {
    async fn fetch(&self) -> std::result::Result<Vec<LiveEvent>, FetchError> {
        let response = self.http.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let events = self.decode(&body)?;
        debug!(count = events.len(), "Fetched live events");
        Ok(events)
    }

    fn name(&self) -> &str {
        "feed"
    }
}
