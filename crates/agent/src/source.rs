//! Transport seam for snapshot retrieval.
//!
//! [`SnapshotSource`] hides how a raw payload is obtained. [`HttpSource`]
//! is the production implementation: a plain `GET` against the configured
//! endpoint using [`reqwest`].

use std::time::Duration;

use async_trait::async_trait;

use crate::error::IngestError;

/// Something that can produce one raw snapshot body per call.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the current payload. Non-success responses are errors.
    async fn fetch(&self) -> Result<String, IngestError>;
}

/// HTTP(S) snapshot endpoint.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    /// Create a source with its own client bounded by `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, url))
    }

    /// Create a source reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SnapshotSource for HttpSource {
    async fn fetch(&self) -> Result<String, IngestError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::HttpStatus(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
