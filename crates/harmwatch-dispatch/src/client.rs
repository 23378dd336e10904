//! HTTP client for the collector endpoint.

use std::time::Duration;

use harmwatch_core::QueueEntry;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::DispatchError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
/// Longest error body kept in [`DispatchError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 200;

/// The JSON body of one delivery: the batch plus a static source tag.
#[derive(Debug, Serialize)]
pub struct DeliveryRequest<'a> {
    pub items: &'a [QueueEntry],
    pub source: &'a str,
}

/// Posts batches to a fixed collector URL.
pub struct CollectorClient {
    client: Client,
    endpoint: Url,
    source_tag: String,
}

impl CollectorClient {
    /// Creates a client that posts to `endpoint`, tagging every batch with
    /// `source_tag`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`DispatchError::InvalidUrl`] if `endpoint` does not parse.
    pub fn new(
        endpoint: &str,
        source_tag: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()?;

        let endpoint = Url::parse(endpoint).map_err(|e| DispatchError::InvalidUrl {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            endpoint,
            source_tag: source_tag.to_string(),
        })
    }

    /// Builds a client from the collector settings in [`harmwatch_core::AppConfig`].
    ///
    /// # Errors
    ///
    /// See [`CollectorClient::new`].
    pub fn from_config(config: &harmwatch_core::AppConfig) -> Result<Self, DispatchError> {
        Self::new(
            &config.collector_url,
            &config.source_tag,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends one batch in a single `POST`. Any 2xx response counts as
    /// accepted; its body is ignored.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Http`] on network failure or timeout.
    /// - [`DispatchError::Status`] on a non-2xx response.
    pub async fn send_batch(&self, items: &[QueueEntry]) -> Result<(), DispatchError> {
        let body = DeliveryRequest {
            items,
            source: &self.source_tag,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        Err(DispatchError::Status {
            status: status.as_u16(),
            body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        })
    }
}
