//! Where poll responses come from.

use std::future::Future;

use scootview_common::error::{Result, ScootviewError};

use crate::error::FetchError;

/// Resolves a request path to a response body.
///
/// Implementors must not retry; a failed request is reported as-is and the
/// next tick asks again.
pub trait MetricSource: Send + Sync + 'static {
    /// Fetches the body served at `path`, relative to the endpoint.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Network` or `FetchError::Status` when no usable
    /// body was received.
    fn fetch(&self, path: &str) -> impl Future<Output = std::result::Result<String, FetchError>> + Send;
}

/// Fetches paths from the player's HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: String,
}

impl HttpSource {
    /// Creates a source rooted at `endpoint`, e.g. `http://127.0.0.1:5000`.
    ///
    /// # Errors
    ///
    /// Returns `ScootviewError::Config` if the HTTP client cannot be built.
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("scootview/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ScootviewError::config(format!("building HTTP client: {e}")))?;
        Ok(Self::with_client(client, endpoint))
    }

    /// Creates a source that reuses an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Self {
        Self {
            client,
            base: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Full URL for a request path.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

impl MetricSource for HttpSource {
    async fn fetch(&self, path: &str) -> std::result::Result<String, FetchError> {
        let url = self.url_for(path);
        tracing::trace!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::network(path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::network(path, e))
    }
}
